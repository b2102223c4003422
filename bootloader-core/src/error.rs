// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unified error path for the update protocol.
//!
//! Every failure collapses to one of these variants; the dispatcher (in the
//! device binary, or a test harness) is the only place that turns this into
//! a wire-visible reaction ("emit byte, reset").

use core::fmt;

use crate::channel::ChannelError;
use crate::flash::FlashError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateError {
    Transport,
    Auth(AuthStage),
    Bounds(&'static str),
    Flash,
}

/// Which authenticated unit failed to verify, for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStage {
    Metadata,
    Frame,
    WholeFirmware,
    ReleaseMessage,
    Combined,
    Decrypt,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::Transport => write!(f, "update aborted: transport error"),
            UpdateError::Auth(stage) => write!(f, "update aborted: authenticator failure at {stage}"),
            UpdateError::Bounds(reason) => write!(f, "update aborted: bounds violation ({reason})"),
            UpdateError::Flash => write!(f, "update aborted: flash program failure"),
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthStage::Metadata => "metadata",
            AuthStage::Frame => "frame",
            AuthStage::WholeFirmware => "whole-firmware",
            AuthStage::ReleaseMessage => "release-message",
            AuthStage::Combined => "combined",
            AuthStage::Decrypt => "decrypt",
        };
        write!(f, "{name}")
    }
}

impl From<ChannelError> for UpdateError {
    fn from(_: ChannelError) -> Self {
        UpdateError::Transport
    }
}

impl From<FlashError> for UpdateError {
    fn from(_: FlashError) -> Self {
        UpdateError::Flash
    }
}
