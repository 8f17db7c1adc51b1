/// What a [`ProgressReport`] is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOperation {
    BuildingSignature,
    ReadingSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub operation: ProgressOperation,
    pub current_position: u64,
    pub total: u64,
}

/// Optional observer for long running operations, nothing is reported when
/// none is registered.
pub type ProgressSink<'a> = Box<dyn FnMut(ProgressReport) + 'a>;

pub fn report(
    sink: &mut Option<ProgressSink<'_>>,
    operation: ProgressOperation,
    current_position: u64,
    total: u64,
) {
    if let Some(sink) = sink {
        sink(ProgressReport {
            operation,
            current_position,
            total,
        });
    }
}
