/// Proportional tree view: each directory with a bar showing its share of
/// its parent's total size.
///
/// ```text
/// 2.0 MB  /home/me
/// ├── [#######   ]  72.0%     1.4 MB  photos
/// │   └── [##########] 100.0%     1.4 MB  2023
/// └── [###       ]  28.0%   573.4 KB  docs
/// ```
///
/// Siblings are ordered by total size, largest first. The tree itself is
/// never reordered; sorting happens on the index positions here.
use super::size::format_size_bound;
use super::{write_colored, write_status_marker};
use std::io;
use termcolor::{Color, WriteColor};
use treescope_core::analysis::SizeIndex;

#[derive(Debug, Clone, Copy)]
pub struct TreeViewOptions {
    /// Deepest level to draw (root = 0). `None` draws everything.
    pub max_depth: Option<u32>,
    /// Width of the bar, in characters, excluding brackets.
    pub bar_width: usize,
}

impl Default for TreeViewOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            bar_width: 10,
        }
    }
}

pub fn render_tree(
    out: &mut dyn WriteColor,
    index: &SizeIndex<'_>,
    options: &TreeViewOptions,
) -> io::Result<()> {
    let root = index.root();
    write_colored(
        out,
        Color::Cyan,
        true,
        &format_size_bound(root.total_size, root.incomplete),
    )?;
    write!(out, "  {}", root.node.path().display())?;
    write_status_marker(out, root.node.status())?;
    writeln!(out)?;

    render_children(out, index, 0, "", 1, options)
}

fn render_children(
    out: &mut dyn WriteColor,
    index: &SizeIndex<'_>,
    parent: usize,
    prefix: &str,
    depth: u32,
    options: &TreeViewOptions,
) -> io::Result<()> {
    if options.max_depth.is_some_and(|max| depth > max) {
        return Ok(());
    }

    let entries = index.entries();
    let mut children = index.children_of(parent);
    children.sort_by(|&a, &b| entries[b].total_size.cmp(&entries[a].total_size));
    let parent_total = entries[parent].total_size;

    for (pos, &child) in children.iter().enumerate() {
        let last = pos + 1 == children.len();
        let entry = &entries[child];
        let percent = share(entry.total_size, parent_total);

        write!(out, "{prefix}{}", if last { "└── " } else { "├── " })?;
        write_colored(
            out,
            bar_color(percent),
            false,
            &bar(percent, options.bar_width),
        )?;
        write!(
            out,
            " {:>5.1}% {:>10}  {}",
            percent,
            format_size_bound(entry.total_size, entry.incomplete),
            entry.node.name()
        )?;
        write_status_marker(out, entry.node.status())?;
        writeln!(out)?;

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(out, index, child, &child_prefix, depth + 1, options)?;
    }
    Ok(())
}

/// Percentage of `part` in `whole`; 0 for an empty parent.
fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `[####      ]` with `width` cells filled in proportion to `percent`.
fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}

/// Green for small shares, yellow for mid, red for dominant ones.
fn bar_color(percent: f64) -> Color {
    if percent < 10.0 {
        Color::Green
    } else if percent < 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
