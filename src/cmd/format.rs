/*!
format.rs

Human-output formatting for `list` / `exec` (JSON paths never use these).

  - StyleOptions::detect() : NO_COLOR / NO_EMOJI / COLUMNS
  - color(role, text, &style)
  - emoji(tag, &style)
  - box_header(title, subtitle, &style)
  - table(headers, rows, &style)
  - truncate_ellipsis(s, max_chars)
*/

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }

    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "info" => "ℹ",
        "tool" => "🛠",
        "list" => "📜",
        _ => "",
    }
}

/// Single-line boxed title with an optional dimmed subtitle.
pub fn box_header(title: impl AsRef<str>, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let plain = match subtitle {
        Some(s) => format!("{}  {}", title.as_ref(), s),
        None => title.as_ref().to_string(),
    };
    let max_inner = style.term_width.saturating_sub(4).max(10);
    let shown = truncate_ellipsis(&plain, max_inner);
    let inner_width = shown.chars().count();

    let styled = match subtitle {
        Some(s) if shown == plain => format!(
            "{}  {}",
            color(Role::Primary, title.as_ref(), style),
            color(Role::Secondary, s, style)
        ),
        _ => color(Role::Primary, &shown, style),
    };

    let bar = "─".repeat(inner_width + 2);
    format!("┌{bar}┐\n│ {styled} │\n└{bar}┘")
}

/// Left-aligned table with a header separator. Overlong cells are truncated so each
/// row fits `style.term_width`; the last column absorbs the shrinkage.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let gaps = cols.saturating_sub(1) * 2;
    let total: usize = widths.iter().sum::<usize>() + gaps;
    if total > style.term_width && cols > 0 {
        let fixed: usize = widths[..cols - 1].iter().sum::<usize>() + gaps;
        widths[cols - 1] = style.term_width.saturating_sub(fixed).max(8);
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let c = truncate_ellipsis(c, widths[i]);
                format!("{c:<width$}", width = widths[i])
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(color(
        Role::Accent,
        render(headers.iter().map(|h| h.to_string()).collect()),
        style,
    ));
    out.push(color(
        Role::Dim,
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
        style,
    ));
    for row in rows {
        out.push(render(row.clone()));
    }
    out.join("\n")
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}
