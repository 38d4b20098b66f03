//! Usage examples appended to each subcommand's `--help`.

use std::fmt::Write;

use crate::commands::{generate, init, scan};
use crate::theme::{ARROW, Tone, paint};

/// A titled block of example invocations.
pub struct ExampleGroup {
    pub heading: &'static str,
    pub lines: &'static [&'static str],
}

/// Example groups for the subcommand called `command`, if it has any.
pub fn examples_for(command: &str) -> Option<&'static [ExampleGroup]> {
    match command {
        "init" => Some(init::EXAMPLES),
        "generate" => Some(generate::EXAMPLES),
        "scan" => Some(scan::EXAMPLES),
        _ => None,
    }
}

pub fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", paint("Examples:", Tone::Heading, true, use_color));

    let arrow = paint(ARROW, Tone::Accent, false, use_color);
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", paint(group.heading, Tone::Title, true, use_color));
        for line in group.lines {
            let _ = writeln!(buffer, "    {arrow} {}", paint(line, Tone::Accent, false, use_color));
        }
    }

    buffer
}
