//! Syllabus CSV import.
//!
//! Expects a header row naming `Date`, `Course` and `Assignment` (any order,
//! extra columns ignored) and dates formatted `YYYY-MM-DD`.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use cogno_storage::Task;

const DATE_COLUMN: &str = "Date";
const COURSE_COLUMN: &str = "Course";
const ASSIGNMENT_COLUMN: &str = "Assignment";

/// One CSV record with the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

impl Record {
    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

/// Split CSV text into records, honoring quoted fields with embedded
/// commas, doubled quotes and newlines
fn parse_records(content: &str) -> Result<Vec<Record>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(Record {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        bail!("Unterminated quoted field starting on line {record_line}");
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
        });
    }

    Ok(records)
}

fn column(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| anyhow::anyhow!("CSV header is missing the '{name}' column"))
}

fn required<'a>(record: &'a Record, index: usize, name: &str) -> Result<&'a str, String> {
    match record.fields.get(index).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("line {}: missing {name}", record.line)),
    }
}

/// Parse a syllabus CSV into tasks owned by `user_id`.
///
/// Every row is validated before anything is returned; one bad row rejects
/// the whole file.
///
/// # Errors
///
/// Returns an error if the header lacks a required column, a quoted field
/// is unterminated, or any row has a missing value or an invalid date
pub fn parse_syllabus_csv(content: &str, user_id: &str) -> Result<Vec<Task>> {
    let mut records = parse_records(content)?
        .into_iter()
        .filter(|r| !r.is_blank());

    let Some(header) = records.next() else {
        bail!("CSV file is empty");
    };
    let date_idx = column(&header.fields, DATE_COLUMN)?;
    let course_idx = column(&header.fields, COURSE_COLUMN)?;
    let assignment_idx = column(&header.fields, ASSIGNMENT_COLUMN)?;

    let mut tasks = Vec::new();
    let mut problems = Vec::new();

    for record in records {
        let row = (|| {
            let date = required(&record, date_idx, DATE_COLUMN)?;
            let course = required(&record, course_idx, COURSE_COLUMN)?;
            let assignment = required(&record, assignment_idx, ASSIGNMENT_COLUMN)?;
            let due = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                format!(
                    "line {}: invalid date '{date}', expected YYYY-MM-DD",
                    record.line
                )
            })?;
            Ok::<_, String>(Task::new(
                user_id.to_string(),
                course.to_string(),
                assignment.to_string(),
                due,
            ))
        })();

        match row {
            Ok(task) => tasks.push(task),
            Err(problem) => problems.push(problem),
        }
    }

    if !problems.is_empty() {
        bail!("Invalid syllabus rows:\n  {}", problems.join("\n  "));
    }

    log::debug!("Parsed {} syllabus rows", tasks.len());
    Ok(tasks)
}
