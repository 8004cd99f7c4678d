use crate::error::RewriteError;
use crate::span::count_lines;
use crate::task::{FileHash, Task};

use super::markdown::RewriteOutput;

/// How one rewrite moved the bytes of its document.
#[derive(Debug, Clone, Copy)]
pub struct OffsetShift<'a> {
    pub path: &'a str,
    /// Start of the replaced range (unchanged by the rewrite).
    pub start: usize,
    /// End of the replaced range in the old document.
    pub end: usize,
    /// `new end - old end`.
    pub delta: isize,
    pub document: &'a str,
    pub hash: FileHash,
    pub replacement: &'a Task,
}

impl<'a> OffsetShift<'a> {
    pub fn new(base: &'a Task, output: &'a RewriteOutput) -> Self {
        Self {
            path: &base.path,
            start: base.start_offset,
            end: base.end_offset,
            delta: output.task.end_offset as isize - base.end_offset as isize,
            document: &output.document,
            hash: output.task.file_hash,
            replacement: &output.task,
        }
    }

    fn overlap(&self, task: &Task) -> RewriteError {
        tracing::error!(
            task_id = %task.id,
            task_start = task.start_offset,
            task_end = task.end_offset,
            start = self.start,
            end = self.end,
            "task span overlaps rewritten range"
        );
        RewriteError::SpanOverlap {
            task_id: task.id.clone(),
            task_start: task.start_offset,
            task_end: task.end_offset,
            start: self.start,
            end: self.end,
        }
    }
}

/// Move `task` (another task of the rewritten document) to its position in
/// the new document.
///
/// Tasks entirely before the rewritten range keep their offsets; tasks
/// entirely after it move by `delta`. Anything else overlaps the range and is
/// reported as [`RewriteError::SpanOverlap`].
pub fn adjust_task(task: &Task, shift: &OffsetShift<'_>) -> Result<Task, RewriteError> {
    if task.end_offset <= shift.start {
        return Ok(Task {
            file_hash: shift.hash,
            ..task.clone()
        });
    }

    if task.start_offset < shift.end {
        return Err(shift.overlap(task));
    }

    let start_offset = task
        .start_offset
        .checked_add_signed(shift.delta)
        .ok_or_else(|| shift.overlap(task))?;
    let end_offset = task
        .end_offset
        .checked_add_signed(shift.delta)
        .ok_or_else(|| shift.overlap(task))?;
    let prefix = shift
        .document
        .get(..end_offset)
        .ok_or(RewriteError::SpanOutOfBounds {
            start: start_offset,
            end: end_offset,
            len: shift.document.len(),
        })?;

    Ok(Task {
        start_offset,
        end_offset,
        start_line: count_lines(&prefix[..start_offset.min(prefix.len())]),
        end_line: count_lines(prefix),
        file_hash: shift.hash,
        ..task.clone()
    })
}

/// Bring a set of known tasks in line with a rewrite.
///
/// The rewritten task itself is replaced by its new version and tasks of
/// other documents pass through untouched.
pub fn adjust_tasks(tasks: &[Task], shift: &OffsetShift<'_>) -> Result<Vec<Task>, RewriteError> {
    tasks
        .iter()
        .map(|task| {
            if task.path != shift.path {
                Ok(task.clone())
            } else if task.id == shift.replacement.id {
                Ok(shift.replacement.clone())
            } else {
                adjust_task(task, shift)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tasks;
    use crate::rewrite::rewrite_task;
    use crate::task::TaskDetails;
    use pretty_assertions::assert_eq;

    const DOC: &str = "- [ ] one\n- [ ] two\n- [ ] three\n";

    #[test]
    fn later_tasks_follow_the_edit() {
        let tasks = parse_tasks("d.md", DOC);
        let edited = TaskDetails {
            title: "two, now longer".into(),
            description: Some("with a body".into()),
            ..tasks[1].details()
        };
        let out = rewrite_task(DOC, &tasks[1], &edited).unwrap();
        let shift = OffsetShift::new(&tasks[1], &out);

        let adjusted = adjust_tasks(&tasks, &shift).unwrap();
        let reparsed = parse_tasks("d.md", &out.document);
        assert_eq!(adjusted.len(), reparsed.len());
        for (a, r) in adjusted.iter().zip(&reparsed) {
            assert_eq!((a.start_offset, a.end_offset), (r.start_offset, r.end_offset));
            assert_eq!((a.start_line, a.end_line), (r.start_line, r.end_line));
            assert_eq!(a.file_hash, r.file_hash);
        }
        assert_eq!(adjusted[0].id, tasks[0].id);
        assert_eq!(adjusted[2].id, tasks[2].id);
    }

    #[test]
    fn shrinking_edit_moves_tasks_back() {
        let tasks = parse_tasks("d.md", DOC);
        let edited = TaskDetails {
            title: "1".into(),
            ..tasks[0].details()
        };
        let out = rewrite_task(DOC, &tasks[0], &edited).unwrap();
        let shift = OffsetShift::new(&tasks[0], &out);
        assert_eq!(shift.delta, -2);

        let moved = adjust_task(&tasks[2], &shift).unwrap();
        assert_eq!(&out.document[moved.span()], "- [ ] three");
    }

    #[test]
    fn overlapping_task_is_an_error() {
        let doc = "- [ ] parent\n  - [ ] child\n";
        let tasks = parse_tasks("n.md", doc);
        assert_eq!(tasks.len(), 2);
        let out = rewrite_task(doc, &tasks[0], &tasks[0].details()).unwrap();
        let shift = OffsetShift::new(&tasks[0], &out);

        let err = adjust_task(&tasks[1], &shift).unwrap_err();
        assert!(matches!(err, RewriteError::SpanOverlap { .. }));
        assert!(adjust_tasks(&tasks, &shift).is_err());
    }

    #[test]
    fn other_documents_are_untouched() {
        let tasks = parse_tasks("d.md", DOC);
        let elsewhere = parse_tasks("other.md", "- [ ] far away\n");
        let out = rewrite_task(DOC, &tasks[0], &tasks[0].details()).unwrap();
        let shift = OffsetShift::new(&tasks[0], &out);

        let adjusted = adjust_tasks(&elsewhere, &shift).unwrap();
        assert_eq!(adjusted, elsewhere);
    }
}
