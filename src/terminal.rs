mod bullet_points;
mod prompt;

pub use bullet_points::{BulletPointPrinter, LineWriter, ProgressBarLineWriter, StdoutLineWriter};
pub use prompt::{edit, prompt, prompt_secret, prompt_select, prompt_yes_no};
