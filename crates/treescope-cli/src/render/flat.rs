/// Flat listing: one block per directory, in report order.
///
/// ```text
/// ┌─ /home/me/photos
/// │  ├─ a.jpg (1.2 MB)
/// │  ├─ b.jpg (800.0 KB)
/// └─ 2.0 MB here, 2.0 MB total
/// ```
use super::size::{format_size, format_size_bound};
use super::{write_colored, write_status_marker};
use std::io;
use termcolor::{Color, WriteColor};
use treescope_core::analysis::{LargestFile, ReportRow, SizeIndex};

/// Render `rows` (usually from `flat_report`) with the files of each
/// directory listed beneath it.
pub fn render_flat(
    out: &mut dyn WriteColor,
    index: &SizeIndex<'_>,
    rows: &[ReportRow],
) -> io::Result<()> {
    for row in rows {
        let entry = &index.entries()[row.index];

        write_colored(out, Color::Cyan, false, "┌─ ")?;
        write!(out, "{}", row.path.display())?;
        write_status_marker(out, row.status)?;
        writeln!(out)?;

        for file in entry.node.files() {
            write_colored(out, Color::White, false, "│  ├─ ")?;
            writeln!(out, "{} ({})", file.name, format_size(file.size))?;
        }

        write_colored(out, Color::Cyan, false, "└─ ")?;
        writeln!(
            out,
            "{} here, {} total",
            format_size(row.own_size),
            format_size_bound(row.total_size, row.incomplete)
        )?;
    }
    Ok(())
}

/// Largest individual files, one per line with a right-aligned size.
pub fn render_largest_files(out: &mut dyn WriteColor, files: &[LargestFile]) -> io::Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    write_colored(out, Color::Cyan, true, "Largest files")?;
    writeln!(out)?;
    for file in files {
        writeln!(out, "{:>10}  {}", format_size(file.size), file.path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;
    use treescope_core::analysis::{flat_report, SortKey};
    use treescope_core::{DirectoryNode, FileEntry, NodeStatus};

    #[test]
    fn test_render_flat() {
        let tree = DirectoryNode::populated(
            "/r",
            vec![
                DirectoryNode::populated("/r/a", vec![], vec![FileEntry::new("f1", 10)]),
                DirectoryNode::degraded("/r/locked", NodeStatus::AccessDenied),
            ],
            vec![],
        );
        let index = SizeIndex::compute(&tree);
        let rows = flat_report(&index, SortKey::OwnSize);

        let mut buf = Buffer::no_color();
        render_flat(&mut buf, &index, &rows).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();

        let expected = "\
┌─ /r/a
│  ├─ f1 (10 B)
└─ 10 B here, 10 B total
┌─ /r
└─ 0 B here, >=10 B total
┌─ /r/locked [access denied]
└─ 0 B here, >=0 B total
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_largest_files() {
        let files = vec![
            LargestFile {
                path: "/r/big.iso".into(),
                size: 2048,
            },
            LargestFile {
                path: "/r/a/f1".into(),
                size: 10,
            },
        ];

        let mut buf = Buffer::no_color();
        render_largest_files(&mut buf, &files).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert_eq!(
            text,
            "\nLargest files\n    2.0 KB  /r/big.iso\n      10 B  /r/a/f1\n"
        );

        let mut empty = Buffer::no_color();
        render_largest_files(&mut empty, &[]).unwrap();
        assert!(empty.into_inner().is_empty());
    }
}
