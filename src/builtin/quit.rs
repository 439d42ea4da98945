//! Builtin `quit`/`exit` commands.
//!
//! Both yield [`ControlAction::Exit`]; the host leaves its input loop when
//! it drains the action from the stream.

use crate::commander::Commander;
use crate::error::Result;
use crate::result::{stream_control, ControlAction};
use crate::token::lit;

/// Registers the `exit` and `quit` commands.
pub fn register(commander: &mut Commander) -> Result<()> {
    for keyword in ["exit", "quit"] {
        commander
            .command()
            .token(lit(keyword))
            .describe("exit the interpreter")
            .handler(|_| stream_control(ControlAction::Exit))
            .register()?;
    }
    Ok(())
}
