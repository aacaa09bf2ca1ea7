//! Text rendering for command output.

use std::path::Path;

use gitview_types::{Attr, FileKind};

/// `ls -l` style permission string, e.g. `dr-xr-xr-x`.
pub fn mode_string(kind: FileKind, perm: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(match kind {
        FileKind::Directory => 'd',
        FileKind::RegularFile => '-',
        FileKind::Symlink => 'l',
    });
    for shift in [6, 3, 0] {
        let bits = (perm >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Human name of a kind, as `stat` prints it.
pub fn kind_name(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Directory => "directory",
        FileKind::RegularFile => "regular file",
        FileKind::Symlink => "symbolic link",
    }
}

/// One `ls -l` line.
pub fn long_line(name: &str, attr: &Attr, target: Option<&Path>) -> String {
    let mut line = format!(
        "{} {:>2} {:>8} {}",
        mode_string(attr.kind, attr.perm),
        attr.nlink,
        attr.size,
        name
    );
    if let Some(target) = target {
        line.push_str(" -> ");
        line.push_str(&target.display().to_string());
    }
    line
}

/// The block printed by `stat`.
pub fn stat_block(path: &str, attr: &Attr) -> String {
    let shown = if path.is_empty() { "/" } else { path };
    format!(
        "  File: {shown}\n  Type: {}\n  Mode: {:07o} ({})\n  Size: {}\n Links: {}\n",
        kind_name(attr.kind),
        attr.mode(),
        mode_string(attr.kind, attr.perm),
        attr.size,
        attr.nlink
    )
}
