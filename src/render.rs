use std::fmt;

use crate::models::Slide;
use crate::session::SessionState;

const HEADING: &str = "Generated Presentation Plan";

/// One slide as shown to the user, numbered from 1.
#[derive(Debug, Clone, Copy)]
pub struct SlideCard<'a> {
    pub number: usize,
    pub slide: &'a Slide,
}

pub fn slide_cards(slides: &[Slide]) -> Vec<SlideCard<'_>> {
    slides
        .iter()
        .enumerate()
        .map(|(idx, slide)| SlideCard {
            number: idx + 1,
            slide,
        })
        .collect()
}

impl fmt::Display for SlideCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Slide {}", self.number)?;
        writeln!(f, "  {}", self.slide.title)?;
        for point in &self.slide.content {
            writeln!(f, "    - {}", point)?;
        }
        if !self.slide.example.is_empty() {
            writeln!(f, "  Example: {}", self.slide.example)?;
        }
        if let Some(visual) = self.slide.visual_suggestion.as_deref() {
            writeln!(f, "  Visual suggestion: {}", visual)?;
        }
        Ok(())
    }
}

/// Plain-text slide cards of a session under a heading. Status messages are
/// not included; callers pick the stream they go to.
pub fn render_slides(state: &SessionState) -> String {
    let cards = slide_cards(state.slides());
    if cards.is_empty() {
        return String::new();
    }
    let body: Vec<String> = cards.iter().map(|card| card.to_string()).collect();
    format!("{}\n\n{}", HEADING, body.join("\n"))
}
