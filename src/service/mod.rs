pub mod assembler;
pub mod browser;
pub mod findings;
pub mod http;
pub mod report;
pub mod scanner;
pub mod scorer;
pub mod sink;

pub use assembler::ReportAssembler;
pub use findings::derive_findings;
pub use scanner::{HttpPageScanner, PageScanner};
pub use scorer::{LighthouseScorer, Scorer};
pub use sink::{publish, BestEffortSink, WebhookSink};
