// Colored terminal output for predictions.

use colored::Colorize;

use super::truncate_chars;
use crate::classifier::extractor::{ScoredLabel, Threshold};

/// Display the labels predicted for one input text.
pub fn display_predictions(text: &str, predictions: &[ScoredLabel], threshold: Threshold) {
    println!("\n{} {}", "Input:".dimmed(), truncate_chars(text, 100));

    if predictions.is_empty() {
        println!(
            "\n  No label reached the threshold ({}).",
            format!("{threshold}").bold()
        );
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== {} label(s) at or above {} ===",
            predictions.len(),
            threshold
        )
        .bold()
    );
    println!();
    println!(
        "  {:>4}  {:<56} {:>7}",
        "Rank".dimmed(),
        "Label".dimmed(),
        "Score".dimmed()
    );
    println!("  {}", "-".repeat(70).dimmed());

    for (i, p) in predictions.iter().enumerate() {
        println!(
            "  {:>4}. {:<56} {}",
            i + 1,
            truncate_chars(&p.label, 56),
            colorize_score(p.score)
        );
    }
    println!();
}

/// Color a probability by confidence band.
fn colorize_score(score: f64) -> colored::ColoredString {
    let s = format!("{score:>7.4}");
    if score >= 0.9 {
        s.green().bold()
    } else if score >= 0.6 {
        s.green()
    } else {
        s.yellow()
    }
}
