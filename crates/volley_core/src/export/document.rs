use serde::{Deserialize, Serialize};

use super::summary::MatchSummary;

/// Page geometry of the exported text, in characters and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    pub line_width: usize,
    pub lines_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self { line_width: 90, lines_per_page: 60 }
    }
}

/// Paginated plain-text match report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub title: String,
    pub pages: Vec<Vec<String>>,
    file_name: String,
}

impl ExportDocument {
    pub fn render(summary: &MatchSummary, layout: PageLayout) -> Self {
        let width = layout.line_width.max(1);
        let per_page = layout.lines_per_page.max(1);
        let title = format!("{} vs {}", summary.winner_name, summary.loser_name);

        let mut lines = vec![
            title.clone(),
            format!("Final result: {}", summary.final_result()),
            format!("Winner: {}", summary.winner_name),
        ];
        if !summary.complete {
            lines.push("Match not finished".to_string());
        }

        lines.push(String::new());
        lines.push("Partial results".to_string());
        lines.extend(summary.sets.iter().map(|s| format!("Set {}: {}", s.set_number, s.score)));

        lines.push(String::new());
        lines.push("Event log".to_string());
        lines.extend(summary.log.iter().cloned());

        let lines: Vec<String> = lines.iter().flat_map(|line| wrap_line(line, width)).collect();
        let pages = lines.chunks(per_page).map(<[String]>::to_vec).collect();

        Self {
            title,
            pages,
            file_name: file_name(&summary.winner_name, &summary.loser_name),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages separated by a form feed.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| {
                let mut text = page.join("\n");
                text.push('\n');
                text
            })
            .collect::<Vec<_>>()
            .join("\u{000C}\n")
    }

    /// Suggested name, `Match-<winner>-vs-<loser>.txt`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

fn file_name(winner: &str, loser: &str) -> String {
    let clean = |name: &str| -> String {
        name.trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
            .collect()
    };
    format!("Match-{}-vs-{}.txt", clean(winner), clean(loser))
}

/// Greedy word wrap. Words longer than `width` are split. An empty input
/// gives one empty line.
pub fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let word_len = chars.len();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
