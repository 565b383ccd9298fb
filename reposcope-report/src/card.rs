//! Box-drawn project cards for the terminal

use reposcope_core::{Evaluation, ProjectCard};

/// Characters between the `│ ` and ` │` borders
pub const CARD_WIDTH: usize = 70;

const ELLIPSIS: &str = "...";

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn pad_right(text: &str, width: usize) -> String {
    let len = char_len(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Cut to `CARD_WIDTH - 3` characters plus "..." when too long
fn fit(text: &str) -> String {
    if char_len(text) > CARD_WIDTH {
        let mut cut: String = text.chars().take(CARD_WIDTH - ELLIPSIS.len()).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        text.to_string()
    }
}

fn row(content: &str) -> String {
    format!("│ {} │", pad_right(content, CARD_WIDTH))
}

fn rule(left: char, right: char) -> String {
    format!("{}{}{}", left, "─".repeat(CARD_WIDTH + 2), right)
}

/// Greedy word wrap to the card width; an overlong word gets a line of its own
fn wrap(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && char_len(&current) + 1 + char_len(word) > CARD_WIDTH {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.into_iter().map(|line| fit(&line)).collect()
}

/// Whole scores keep one decimal, e.g. `8.0`
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}

/// Draw a card: name and year, description, tags and, when given, the
/// rating with its wrapped reason.
pub fn format_card(card: &ProjectCard, evaluation: Option<&Evaluation>) -> String {
    let year = card.year.as_deref().unwrap_or_default();
    let name = fit(&card.name);
    let year_width = CARD_WIDTH.saturating_sub(char_len(&name)).max(char_len(year) + 1);
    let header = format!("{}{:>width$}", name, year, width = year_width);

    let mut lines = vec![
        rule('┌', '┐'),
        row(&fit(&header)),
        rule('├', '┤'),
        row(&fit(card.description.as_deref().unwrap_or_default())),
        row(&fit(&card.tags.join(" "))),
    ];

    if let Some(evaluation) = evaluation {
        lines.push(row(&format!("Score: {}/10", format_score(evaluation.score))));
        lines.extend(wrap(&evaluation.reason).iter().map(|line| row(line)));
    }

    lines.push(rule('└', '┘'));

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ProjectCard {
        ProjectCard {
            name: "weather-bot".to_string(),
            year: Some("2022".to_string()),
            description: Some("A Discord bot that posts forecasts.".to_string()),
            tags: vec!["Python".to_string(), "discord.py".to_string()],
        }
    }

    fn widths(rendered: &str) -> Vec<usize> {
        rendered.lines().map(char_len).collect()
    }

    #[test]
    fn test_card_rows_share_one_width() {
        let evaluation = Evaluation {
            score: 7.5,
            reason: "Handles rate limits and scheduling well. ".repeat(5),
        };
        let rendered = format_card(&card(), Some(&evaluation));

        let widths = widths(&rendered);
        assert!(widths.iter().all(|w| *w == CARD_WIDTH + 4), "{:?}", widths);
        assert!(rendered.starts_with("┌"));
        assert!(rendered.ends_with("┘\n"));
    }

    #[test]
    fn test_header_right_aligns_year() {
        let rendered = format_card(&card(), None);
        let header = rendered.lines().nth(1).unwrap();
        assert!(header.starts_with("│ weather-bot "));
        assert!(header.ends_with("2022 │"));
        assert_eq!(rendered.lines().count(), 6);
    }

    #[test]
    fn test_long_fields_are_cut() {
        let mut long = card();
        long.description = Some("d".repeat(90));
        let rendered = format_card(&long, None);
        let description = rendered.lines().nth(3).unwrap();
        assert!(description.contains(&format!("{}...", "d".repeat(67))));
        assert!(!description.contains(&"d".repeat(68)));
    }

    #[test]
    fn test_score_line_and_reason_wrap() {
        let evaluation = Evaluation {
            score: 8.0,
            reason: "word ".repeat(30),
        };
        let rendered = format_card(&card(), Some(&evaluation));
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[5].starts_with("│ Score: 8.0/10 "));
        // 30 five-character words wrap onto three lines
        assert_eq!(lines.len(), 6 + 1 + 3);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(8.0), "8.0");
        assert_eq!(format_score(7.5), "7.5");
        assert_eq!(format_score(0.0), "0.0");
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let lines = wrap(&format!("short {} tail", "x".repeat(100)));
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| char_len(line) <= CARD_WIDTH));
    }
}
