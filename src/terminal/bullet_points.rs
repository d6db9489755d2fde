use indicatif::ProgressBar;

const INDENT_SIZE: usize = 2;

pub struct BulletPointPrinter<W: LineWriter + Clone> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl std::fmt::Display) {
        let indent = " ".repeat(self.nesting * INDENT_SIZE);
        self.writer.write_line(&format!("{}• {}", indent, message));
    }

    pub fn indent(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + 1,
        }
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new_stdout() -> Self {
        Self::new(StdoutLineWriter)
    }
}

impl<'a> BulletPointPrinter<ProgressBarLineWriter<'a>> {
    /// Prints above the progress bar instead of garbling it
    pub fn new_progress_bar(progress_bar: &'a ProgressBar) -> Self {
        Self::new(ProgressBarLineWriter { progress_bar })
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;
impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

#[derive(Clone, Copy)]
pub struct ProgressBarLineWriter<'a> {
    progress_bar: &'a ProgressBar,
}

impl<'a> LineWriter for ProgressBarLineWriter<'a> {
    fn write_line(&self, line: &str) {
        self.progress_bar.println(line)
    }
}
