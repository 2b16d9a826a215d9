use std::process::ExitCode;

use chirpstack_provider::{init_logging, serve, ChirpstackProvider};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match serve(ChirpstackProvider::new()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Provider exited");
            ExitCode::FAILURE
        }
    }
}
