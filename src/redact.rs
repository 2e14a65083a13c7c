/// Replaceable PII-redaction seam. The reference implementation passes text
/// through untouched; a real redactor slots in without touching the pipeline.
pub trait Redactor {
    fn redact(&self, text: &str) -> String;
}

pub struct Passthrough;

impl Redactor for Passthrough {
    fn redact(&self, text: &str) -> String {
        text.to_string()
    }
}
