//! Plain-text layout of chat entries, plus terminal colouring.

use colored::Colorize;
use recipe_chef::Recipe;

use crate::conversation::ChatEntry;

const UNTITLED: &str = "Untitled Recipe";
const NO_DURATION: &str = "—";

/// Role of a rendered line; decides its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    User,
    Status,
    Heading,
    Detail,
    Missing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Human list: `a`, `a and b`, `a, b, and c`.
pub fn pretty_join<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// `15 min`, or a dash when the duration is unknown or zero.
pub fn duration_label(minutes: Option<u64>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{m} min"),
        _ => NO_DURATION.to_string(),
    }
}

pub fn recipe_lines(recipe: &Recipe) -> Vec<Line> {
    let title = if recipe.title.trim().is_empty() {
        UNTITLED
    } else {
        recipe.title.as_str()
    };
    let mut lines = vec![Line::new(
        LineKind::Heading,
        format!("🍲 {title}   ⏱ {}", duration_label(recipe.time_minutes)),
    )];

    if !recipe.uses.is_empty() {
        lines.push(Line::new(
            LineKind::Detail,
            format!("Uses: {}", pretty_join(recipe.uses.as_slice())),
        ));
    }
    if !recipe.missing.is_empty() {
        lines.push(Line::new(
            LineKind::Missing,
            format!("Missing - {}", pretty_join(recipe.missing.as_slice())),
        ));
    }
    if !recipe.steps.is_empty() {
        lines.push(Line::new(LineKind::Heading, "Steps"));
        lines.extend(
            recipe
                .steps
                .iter()
                .map(|step| Line::new(LineKind::Detail, format!("  - {step}"))),
        );
    }
    lines
}

pub fn entry_lines(entry: &ChatEntry) -> Vec<Line> {
    match entry {
        ChatEntry::UserMessage(text) => vec![Line::new(LineKind::User, format!("🐶 {text}"))],
        ChatEntry::StatusMessage(text) => vec![Line::new(LineKind::Status, text.clone())],
        ChatEntry::RecipeCard(recipe) => recipe_lines(recipe),
        ChatEntry::ShoppingListCard(items) => std::iter::once(Line::new(
            LineKind::Heading,
            "🛒 Shopping List",
        ))
        .chain(
            items
                .iter()
                .map(|item| Line::new(LineKind::Detail, format!("  • {item}"))),
        )
        .collect(),
        ChatEntry::ErrorMessage(text) => vec![Line::new(LineKind::Error, format!("⚠️ {text}"))],
    }
}

/// Uncoloured text of one entry, one line per row.
pub fn entry_text(entry: &ChatEntry) -> String {
    entry_lines(entry)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coloured text of one entry for the terminal.
pub fn paint_entry(entry: &ChatEntry) -> String {
    entry_lines(entry)
        .iter()
        .map(paint_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint_line(line: &Line) -> String {
    let text = line.text.as_str();
    match line.kind {
        LineKind::User => text.bright_cyan().bold().to_string(),
        LineKind::Status => text.dimmed().to_string(),
        LineKind::Heading => text.yellow().bold().to_string(),
        LineKind::Detail => text.normal().to_string(),
        LineKind::Missing => text.magenta().to_string(),
        LineKind::Error => text.red().bold().to_string(),
    }
}
