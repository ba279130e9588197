//  Copyright 2024 cachesim Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use std::fmt::Debug;

/// Simulation error.
///
/// Every variant is fatal to the run: there is nothing transient to retry against.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A request was issued before the last processed request.
    #[error("request {key} issued at {issued_at} precedes the simulation clock {clock}")]
    OutOfOrder {
        /// `Debug` rendering of the offending key.
        key: String,
        /// Timestamp of the offending request.
        issued_at: f64,
        /// Timestamp of the last processed request.
        clock: f64,
    },
    /// A policy broke the engine contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),
    /// The trace is malformed and the run cannot continue past it.
    #[error("trace integrity error: {0}")]
    TraceIntegrity(String),
    /// Config error.
    #[error("config error: {0}")]
    Config(String),
    /// I/O error from a file-backed trace.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// CSV decoding error from a file-backed trace.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Out-of-order error for the given key.
    pub fn out_of_order(key: &impl Debug, issued_at: f64, clock: f64) -> Self {
        Self::OutOfOrder {
            key: format!("{key:?}"),
            issued_at,
            clock,
        }
    }

    /// Contract violation error.
    pub fn contract_violation(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    /// Trace integrity error.
    pub fn trace_integrity(msg: impl Into<String>) -> Self {
        Self::TraceIntegrity(msg.into())
    }

    /// Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Simulation result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_display() {
        let e = Error::out_of_order(&"abc", 1.0, 2.5);
        assert_eq!(
            e.to_string(),
            r#"request "abc" issued at 1 precedes the simulation clock 2.5"#
        );
    }
}
