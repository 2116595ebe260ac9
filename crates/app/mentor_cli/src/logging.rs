use flexi_logger::{Logger, colored_default_format};

use crate::Error;

/// Log to stderr so stdout carries only the conversation.
pub fn init() -> Result<(), Error> {
    Logger::try_with_env_or_str("warn")?
        .format(colored_default_format)
        .log_to_stderr()
        .start()?;

    Ok(())
}
