// Copyright 2025 Boundless, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Errors surfaced by portal operations. All of these are recoverable:
/// the session keeps running and the user may retry.
#[derive(Debug, Error)]
pub enum PortalError {
    /// No wallet provider is available; connect and write actions are
    /// disabled.
    #[error("no wallet provider detected")]
    ProviderAbsent,

    /// The user declined the connection prompt.
    #[error("wallet authorization rejected")]
    AuthorizationRejected,

    /// The draft message failed validation; nothing was submitted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Submission or mining of a wave transaction failed.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// A contract read failed; local state stays at its previous value.
    #[error("read failed: {0}")]
    Read(String),

    /// A wave was requested while another one is still outstanding.
    #[error("a wave transaction is already pending")]
    AlreadyPending,
}
