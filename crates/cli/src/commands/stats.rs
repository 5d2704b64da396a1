// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use renderq_wire::{Request, Response};

use crate::client::CoordinatorClient;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

pub async fn run(client: &CoordinatorClient, format: OutputFormat) -> Result<(), ExitError> {
    match client.send_checked(Request::GetStats).await.map_err(ExitError::from_err)? {
        Response::Stats { stats } => {
            output::print_stats(format, &stats);
            Ok(())
        }
        other => Err(ExitError::new(1, format!("unexpected response from coordinator: {other:?}"))),
    }
}
