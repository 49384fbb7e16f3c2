/// Execution classes used for task naming and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Batch coordination that gates what the user sees next.
	Interactive,
	/// Outbound source calls; may be slow and are never cancelled.
	SourceCall,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::SourceCall => "source_call",
		}
	}
}
