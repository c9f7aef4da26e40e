use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match lora_mapper::app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "lora-mapper stopped");
            ExitCode::FAILURE
        }
    }
}
