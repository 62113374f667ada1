//! Fixed-window text chunking with character overlap.
//!
//! Windows advance by `chunk_size - chunk_overlap`, so each chunk after the
//! first begins with exactly the last `chunk_overlap` characters of its
//! predecessor. The final window keeps whatever remains; nothing is trimmed
//! or dropped, so concatenating chunks minus their overlaps reproduces the
//! input.

use crate::parser::ParsedCourse;
use crate::types::CourseChunk;

/// Split `text` into overlapping windows of at most `chunk_size` bytes,
/// snapped to char boundaries.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let len = text.len();
    if len == 0 || chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = (start + chunk_size).min(len);
        while end < len && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            // Window smaller than one char; take the next whole char.
            end = (start + 1..=len)
                .find(|&i| text.is_char_boundary(i))
                .unwrap_or(len);
        }
        chunks.push(text[start..end].to_string());
        if end == len {
            break;
        }
        let mut next = end.saturating_sub(overlap);
        while !text.is_char_boundary(next) {
            next -= 1;
        }
        if next <= start {
            // Guarantees forward progress when overlap >= chunk size.
            next = end;
        }
        start = next;
    }
    chunks
}

/// Chunk every lesson body of a parsed course. Chunk indices count across
/// the whole course, not per lesson.
pub fn chunk_course(parsed: &ParsedCourse, chunk_size: usize, overlap: usize) -> Vec<CourseChunk> {
    let mut chunks = Vec::new();
    let mut index: u32 = 0;
    for content in &parsed.contents {
        for piece in chunk_text(&content.body, chunk_size, overlap) {
            chunks.push(CourseChunk {
                text: piece,
                course_title: parsed.course.title.clone(),
                lesson_number: content.lesson.number,
                chunk_index: index,
            });
            index += 1;
        }
    }
    chunks
}
