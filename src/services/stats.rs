use crate::models::{FileQueue, FileState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub uploaded: usize,
    pub processing: usize,
    pub success: usize,
    pub error: usize,
}

/// Pure aggregation over the queue for display. Call between mutation
/// steps, never while a coordinator is awaiting a network response.
pub fn queue_stats(queue: &FileQueue) -> QueueStats {
    let mut stats = QueueStats {
        total: queue.len(),
        uploaded: 0,
        processing: 0,
        success: 0,
        error: 0,
    };

    for item in queue.items() {
        match item.state {
            FileState::Uploaded => stats.uploaded += 1,
            FileState::Processing => stats.processing += 1,
            FileState::Success => stats.success += 1,
            FileState::Error => stats.error += 1,
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileItem, MetadataMap};
    use bytes::Bytes;

    #[test]
    fn test_counts_group_by_state_and_sum_to_total() {
        let mut queue = FileQueue::new();

        let a = FileItem::new("a".to_string(), Bytes::from_static(b"x"));
        queue.push(a);

        let b = FileItem::new("b".to_string(), Bytes::from_static(b"x"));
        let b_id = b.id;
        queue.push(b);
        queue.mark_processing(b_id);
        queue.complete(b_id, MetadataMap::new(), MetadataMap::new(), None);

        let c = FileItem::new("c".to_string(), Bytes::from_static(b"x"));
        let c_id = c.id;
        queue.push(c);
        queue.mark_processing(c_id);
        queue.fail(c_id, "boom".to_string());

        let stats = queue_stats(&queue);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.error, 1);
        assert_eq!(
            stats.uploaded + stats.processing + stats.success + stats.error,
            stats.total
        );
    }
}
