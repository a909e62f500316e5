//! Report Composer
//!
//! Has the text service write the report narrative, then parses its emphasis
//! markup into a [`Report`] and renders it.

use llm_core::TextCompletion;
use tracing::{debug, info};

use crate::error::{RenderError, ReportGenerationError};
use crate::model::{PortfolioAnalysis, Recommendation};
use crate::report::{PageLayout, Report, render};

pub const REPORT_MAX_TOKENS: u32 = 700;
pub const REPORT_TEMPERATURE: f32 = 0.6;

#[derive(Clone, Debug)]
pub struct ReportComposer {
    completion: TextCompletion,
    layout: PageLayout,
}

impl ReportComposer {
    pub const fn new(completion: TextCompletion, layout: PageLayout) -> Self {
        Self { completion, layout }
    }

    pub const fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn prompt(analysis: &PortfolioAnalysis, recommendation: &Recommendation) -> Result<String, serde_json::Error> {
        let analysis = analysis.to_prompt_json()?;
        Ok(format!(
            "Generate a concise one-page report summarizing the following portfolio analysis:\n\n\
             {analysis}\n\nand the following optimization recommendations:\n\n{}\n\n\
             Include clear headings, bullet points for key metrics, and use **bold** for \
             emphasis where appropriate.",
            recommendation.text
        ))
    }

    /// Write the narrative and parse it into paragraphs
    pub async fn compose(
        &self,
        analysis: &PortfolioAnalysis,
        recommendation: &Recommendation,
    ) -> Result<Report, ReportGenerationError> {
        let prompt = Self::prompt(analysis, recommendation)?;
        debug!(prompt_chars = prompt.len(), "Requesting report narrative");

        let narrative = self
            .completion
            .complete(&prompt, REPORT_MAX_TOKENS, REPORT_TEMPERATURE)
            .await?;

        let report = Report::from_markup(&narrative);
        info!(paragraphs = report.paragraphs.len(), "Report composed");
        Ok(report)
    }

    /// Render with this composer's page layout
    pub fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        render(report, &self.layout)
    }
}
