//! Course document parser.
//!
//! Documents are plain text with a three-line course header followed by
//! lesson sections:
//!
//! ```text
//! Course Title: Building RAG Systems
//! Course Link: https://example.com/rag
//! Course Instructor: Ada Lovelace
//!
//! Lesson 0: Introduction
//! Lesson Link: https://example.com/rag/0
//! Welcome to the course...
//! ```
//!
//! A document without any `Lesson N:` markers becomes a single implicit
//! lesson 0 titled "Overview".

use std::path::Path;

use lectern_core::{AppError, AppResult};

use crate::types::{Course, Lesson};

const TITLE_PREFIX: &str = "Course Title:";
const LINK_PREFIX: &str = "Course Link:";
const INSTRUCTOR_PREFIX: &str = "Course Instructor:";
const LESSON_LINK_PREFIX: &str = "Lesson Link:";

/// A lesson together with its raw body text, before chunking.
#[derive(Debug, Clone)]
pub struct LessonContent {
    pub lesson: Lesson,
    pub body: String,
}

/// Parsed course metadata plus per-lesson bodies.
#[derive(Debug, Clone)]
pub struct ParsedCourse {
    pub course: Course,
    pub contents: Vec<LessonContent>,
}

/// Read and parse a course document from disk.
pub fn parse_course_file(path: &Path) -> AppResult<ParsedCourse> {
    let raw = std::fs::read_to_string(path)?;
    parse_course(&raw).map_err(|e| match e {
        AppError::Parse(msg) => AppError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse a course document from its raw text.
pub fn parse_course(raw: &str) -> AppResult<ParsedCourse> {
    let lines: Vec<&str> = raw.lines().collect();

    let mut title = None;
    let mut link = None;
    let mut instructor = None;

    // Header fields may appear in any order before the first lesson marker.
    let mut cursor = 0;
    while cursor < lines.len() {
        let line = lines[cursor].trim();
        if line.is_empty() {
            cursor += 1;
            continue;
        }
        if parse_lesson_marker(line).is_some() {
            break;
        }
        if let Some(value) = line.strip_prefix(TITLE_PREFIX) {
            title = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(LINK_PREFIX) {
            link = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(INSTRUCTOR_PREFIX) {
            instructor = Some(value.trim().to_string());
        } else {
            // Body text before any marker; handled below as implicit lesson 0.
            break;
        }
        cursor += 1;
    }

    let title = title.ok_or_else(|| missing_field("Course Title"))?;
    let link = link.ok_or_else(|| missing_field("Course Link"))?;
    let instructor = instructor.ok_or_else(|| missing_field("Course Instructor"))?;
    if title.is_empty() {
        return Err(AppError::Parse("course title is empty".to_string()));
    }

    let contents = parse_lessons(&lines[cursor..])?;
    let lessons = contents.iter().map(|c| c.lesson.clone()).collect();

    Ok(ParsedCourse {
        course: Course {
            title,
            link,
            instructor,
            lessons,
        },
        contents,
    })
}

fn missing_field(field: &str) -> AppError {
    AppError::Parse(format!("missing required header field '{}'", field))
}

/// Split the remaining lines into lesson sections.
fn parse_lessons(lines: &[&str]) -> AppResult<Vec<LessonContent>> {
    let mut contents: Vec<LessonContent> = Vec::new();
    let mut current: Option<(Lesson, Vec<String>)> = None;
    let mut expect_lesson_link = false;

    for raw_line in lines {
        let line = raw_line.trim_end();
        if let Some((number, lesson_title)) = parse_lesson_marker(line.trim()) {
            if let Some((lesson, body)) = current.take() {
                push_lesson(&mut contents, lesson, body)?;
            }
            current = Some((
                Lesson {
                    number,
                    title: lesson_title,
                    link: None,
                },
                Vec::new(),
            ));
            expect_lesson_link = true;
            continue;
        }

        // A lesson link line is only recognized directly under its marker.
        if expect_lesson_link {
            if let Some(value) = line.trim().strip_prefix(LESSON_LINK_PREFIX) {
                if let Some((lesson, _)) = current.as_mut() {
                    lesson.link = Some(value.trim().to_string());
                }
                expect_lesson_link = false;
                continue;
            }
            if !line.trim().is_empty() {
                expect_lesson_link = false;
            }
        }

        match current.as_mut() {
            Some((_, body)) => body.push(line.to_string()),
            None => {
                // Text before any marker: the whole remainder is lesson 0.
                current = Some((
                    Lesson {
                        number: 0,
                        title: "Overview".to_string(),
                        link: None,
                    },
                    vec![line.to_string()],
                ));
                expect_lesson_link = false;
            }
        }
    }

    if let Some((lesson, body)) = current.take() {
        push_lesson(&mut contents, lesson, body)?;
    }

    Ok(contents)
}

fn push_lesson(
    contents: &mut Vec<LessonContent>,
    lesson: Lesson,
    body_lines: Vec<String>,
) -> AppResult<()> {
    if contents.iter().any(|c| c.lesson.number == lesson.number) {
        return Err(AppError::Parse(format!(
            "duplicate lesson number {}",
            lesson.number
        )));
    }
    let body = body_lines.join("\n").trim().to_string();
    contents.push(LessonContent { lesson, body });
    Ok(())
}

/// Recognize a `Lesson N: Title` section marker.
fn parse_lesson_marker(line: &str) -> Option<(u32, String)> {
    let rest = line.strip_prefix("Lesson ")?;
    let (number_part, title_part) = rest.split_once(':')?;
    let number = number_part.trim().parse::<u32>().ok()?;
    Some((number, title_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Course Title: Building RAG Systems
Course Link: https://example.com/rag
Course Instructor: Ada Lovelace

Lesson 0: Introduction
Lesson Link: https://example.com/rag/0
Welcome to the course. We cover retrieval basics.

Lesson 1: Chunking
Text is split into overlapping windows.
Overlap keeps context across boundaries.
";

    #[test]
    fn parses_header_and_lessons() {
        let parsed = parse_course(SAMPLE).unwrap();
        assert_eq!(parsed.course.title, "Building RAG Systems");
        assert_eq!(parsed.course.link, "https://example.com/rag");
        assert_eq!(parsed.course.instructor, "Ada Lovelace");
        assert_eq!(parsed.course.lessons.len(), 2);

        let first = &parsed.contents[0];
        assert_eq!(first.lesson.number, 0);
        assert_eq!(first.lesson.title, "Introduction");
        assert_eq!(
            first.lesson.link.as_deref(),
            Some("https://example.com/rag/0")
        );
        assert!(first.body.starts_with("Welcome to the course."));

        let second = &parsed.contents[1];
        assert_eq!(second.lesson.number, 1);
        assert_eq!(second.lesson.link, None);
        assert!(second.body.contains("overlapping windows"));
    }

    #[test]
    fn missing_instructor_is_a_parse_error() {
        let raw = "Course Title: X\nCourse Link: https://example.com\n\nLesson 0: A\nbody\n";
        let err = parse_course(raw).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("Course Instructor"));
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        let raw = "Course Link: https://example.com\nCourse Instructor: I\nbody text\n";
        let err = parse_course(raw).unwrap_err();
        assert!(err.to_string().contains("Course Title"));
    }

    #[test]
    fn no_markers_yield_implicit_overview_lesson() {
        let raw = "\
Course Title: Quick Notes
Course Link: https://example.com/notes
Course Instructor: N. Body

These notes have no lesson structure at all.
Just a flat body of text.
";
        let parsed = parse_course(raw).unwrap();
        assert_eq!(parsed.contents.len(), 1);
        let only = &parsed.contents[0];
        assert_eq!(only.lesson.number, 0);
        assert_eq!(only.lesson.title, "Overview");
        assert_eq!(only.lesson.link, None);
        assert!(only.body.contains("no lesson structure"));
    }

    #[test]
    fn duplicate_lesson_numbers_rejected() {
        let raw = "\
Course Title: Dup
Course Link: https://example.com
Course Instructor: I

Lesson 1: First
a

Lesson 1: Again
b
";
        let err = parse_course(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate lesson number 1"));
    }

    #[test]
    fn lesson_link_only_recognized_under_marker() {
        let raw = "\
Course Title: T
Course Link: https://example.com
Course Instructor: I

Lesson 2: Deep Dive
First paragraph.
Lesson Link: https://not-a-link-line
";
        let parsed = parse_course(raw).unwrap();
        let lesson = &parsed.contents[0].lesson;
        assert_eq!(lesson.number, 2);
        assert_eq!(lesson.link, None);
        assert!(parsed.contents[0].body.contains("not-a-link-line"));
    }

    #[test]
    fn header_fields_in_any_order() {
        let raw = "\
Course Instructor: I
Course Title: T
Course Link: https://example.com

Lesson 0: A
body
";
        let parsed = parse_course(raw).unwrap();
        assert_eq!(parsed.course.title, "T");
        assert_eq!(parsed.course.instructor, "I");
    }

    #[test]
    fn header_only_document_has_no_lessons() {
        let raw = "Course Title: T\nCourse Link: https://example.com\nCourse Instructor: I\n";
        let parsed = parse_course(raw).unwrap();
        assert!(parsed.contents.is_empty());
        assert!(parsed.course.lessons.is_empty());
    }
}
