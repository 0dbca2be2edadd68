use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use todolist_core::config::Config;
use todolist_core::{Screen, ViewState};
use todolist_core::view::PLACEHOLDER_ROWS;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all)]
    pub fn print_view<W: Write>(&self, mut out: W, state: &ViewState) -> anyhow::Result<()> {
        if let Some(account) = &state.account {
            writeln!(out, "account   {account}")?;
        }

        match state.screen() {
            Screen::ConnectWallet => {
                writeln!(
                    out,
                    "No wallet connected. Set wallet.account or configure an aptos CLI profile."
                )?;
            }
            Screen::NeedsList => {
                writeln!(
                    out,
                    "You need to create a todo list before adding tasks. Run `todolist create-list`."
                )?;
            }
            Screen::Loading => {
                for _ in 0..PLACEHOLDER_ROWS {
                    writeln!(out, "{}", self.paint("[ ] ...", "2"))?;
                }
            }
            Screen::Empty => {
                writeln!(out, "No tasks yet. Add your first task with `todolist add <text>`.")?;
            }
            Screen::Tasks => {
                let rows = state
                    .tasks
                    .iter()
                    .map(|task| {
                        let mark = if task.completed { "[x]" } else { "[ ]" };
                        let content = if task.completed {
                            self.paint(&task.content, "9")
                        } else {
                            task.content.clone()
                        };
                        vec![self.paint(&task.task_id.to_string(), "33"), mark.to_string(), content]
                    })
                    .collect();
                write_table(&mut out, vec!["ID".into(), "Done".into(), "Task".into()], rows)?;
            }
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut line = String::new();
    for idx in 0..column_count {
        line.push_str(&format!("{:width$} ", headers[idx], width = widths[idx]));
    }
    writeln!(writer, "{}", line.trim_end())?;

    line.clear();
    for width in &widths {
        line.push_str(&format!("{:-<width$} ", "", width = width));
    }
    writeln!(writer, "{}", line.trim_end())?;

    for row in rows {
        line.clear();
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            line.push_str(&format!("{}{} ", cell, " ".repeat(padding)));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use todolist_core::{Task, ViewState};

    use super::{Renderer, strip_ansi};

    fn state_with(tasks: Vec<Task>) -> ViewState {
        ViewState {
            account: Some("0xa11ce".parse().unwrap()),
            has_list: true,
            loading: false,
            tasks,
            ..ViewState::default()
        }
    }

    #[test]
    fn prints_aligned_task_table() {
        let owner = "0xa11ce".parse().unwrap();
        let state = state_with(vec![
            Task { address: owner, completed: true, content: "Buy milk".into(), task_id: 1 },
            Task { address: "0xa11ce".parse().unwrap(), completed: false, content: "Walk dog".into(), task_id: 2 },
        ]);

        let mut out = Vec::new();
        Renderer::plain().print_view(&mut out, &state).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "account   0xa11ce\nID Done Task\n-- ---- --------\n1  [x]  Buy milk\n2  [ ]  Walk dog\n"
        );
    }

    #[test]
    fn empty_and_disconnected_messages() {
        let mut out = Vec::new();
        Renderer::plain().print_view(&mut out, &state_with(vec![])).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No tasks yet"));

        let mut out = Vec::new();
        Renderer::plain().print_view(&mut out, &ViewState::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No wallet connected"));
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi("\x1b[33m12\x1b[0m"), "12");
    }
}
