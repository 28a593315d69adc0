mod config_cmd;
mod order;
mod product;
mod user;

pub use config_cmd::ConfigCommand;
pub use order::OrderCommand;
pub use product::ProductCommand;
pub use user::UserCommand;

use clap::ValueEnum;
use serde_json::Value;
use std::io::{self, Write};

use vibe_admin::{Entity, Fields, StoreError};

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses `key=value` arguments into document fields.
///
/// Values that parse as JSON keep their JSON type (`price=10` is a number,
/// `active=false` a bool); anything else is stored as a string.
pub fn parse_assignments(pairs: &[String]) -> Result<Fields, StoreError> {
    let mut fields = Fields::new();

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| StoreError::Validation(format!("expected KEY=VALUE, got '{}'", pair)))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::Validation(format!(
                "empty field name in '{}'",
                pair
            )));
        }
        if key == "id" {
            return Err(StoreError::Validation(
                "the id field is assigned by the store".into(),
            ));
        }

        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }

    Ok(fields)
}

fn cell(entity: &Entity, column: &str) -> String {
    match entity.get(column) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Prints entities as a table of the given columns, or as JSON.
pub fn print_entities(
    entities: &[Entity],
    columns: &[&str],
    format: OutputFormat,
    noun: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(entities)?);
        return Ok(());
    }

    if entities.is_empty() {
        println!("No {}s found", noun);
        return Ok(());
    }

    let mut header = format!("{:<32}", "ID");
    for column in columns {
        header.push_str(&format!("  {:<16}", column.to_uppercase()));
    }
    println!("{}", header.trim_end());
    println!("{}", "-".repeat(32 + 18 * columns.len()));

    for entity in entities {
        let mut line = format!("{:<32}", entity.id);
        for column in columns {
            line.push_str(&format!("  {:<16}", truncate(&cell(entity, column), 16)));
        }
        println!("{}", line.trim_end());
    }
    println!("\nTotal: {} {}(s)", entities.len(), noun);
    Ok(())
}

pub fn print_entity(entity: &Entity, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entity)?),
        OutputFormat::Text => print!("{}", entity),
    }
    Ok(())
}

/// Asks for a y/N confirmation on stdin.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_assignments_types() {
        let fields = parse_assignments(&args(&[
            "price=10",
            "active=false",
            "category=flower",
            "tags=[\"a\",\"b\"]",
            "note=a=b",
        ]))
        .unwrap();

        assert_eq!(fields["price"], json!(10));
        assert_eq!(fields["active"], json!(false));
        assert_eq!(fields["category"], json!("flower"));
        assert_eq!(fields["tags"], json!(["a", "b"]));
        assert_eq!(fields["note"], json!("a=b"));
    }

    #[test]
    fn test_parse_assignments_rejects_bad_input() {
        assert!(matches!(
            parse_assignments(&args(&["price"])),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            parse_assignments(&args(&[" =3"])),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            parse_assignments(&args(&["id=abc"])),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 16), "short");
        assert_eq!(truncate("a very long product name", 10), "a very ...");
    }
}
