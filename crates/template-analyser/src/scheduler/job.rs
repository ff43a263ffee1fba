use crate::error::ExtractionError;
use crate::matcher::FieldCodeCount;
use crate::result::TemplateAnalysis;
use crate::source::Template;

/// One template handed to a worker, tagged with its position in the source.
#[derive(Debug)]
pub struct Job {
    pub index: usize,
    pub template: Template,
}

impl Job {
    pub fn new(index: usize, template: Template) -> Self {
        Self { index, template }
    }
}

/// What a worker sends back for a [`Job`].
#[derive(Debug)]
pub struct JobResult {
    pub index: usize,
    pub template_name: String,
    pub outcome: Result<Vec<FieldCodeCount>, ExtractionError>,
}

impl JobResult {
    pub fn success(job: &Job, counts: Vec<FieldCodeCount>) -> Self {
        Self {
            index: job.index,
            template_name: job.template.name.clone(),
            outcome: Ok(counts),
        }
    }

    pub fn failure(job: &Job, error: ExtractionError) -> Self {
        Self {
            index: job.index,
            template_name: job.template.name.clone(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Splits into the analysis (on success) or the extraction error.
    pub fn into_analysis(self) -> Result<TemplateAnalysis, (String, ExtractionError)> {
        match self.outcome {
            Ok(counts) => Ok(TemplateAnalysis::new(self.template_name, counts)),
            Err(e) => Err((self.template_name, e)),
        }
    }
}
