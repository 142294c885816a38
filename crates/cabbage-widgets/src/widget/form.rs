//! Root canvas of a panel.

use super::common::{rect, svg_frame};
use super::{Widget, WidgetCore};
use crate::markup::Markup;

#[derive(Debug)]
pub struct Form {
    core: WidgetCore,
}

impl Form {
    pub fn new(core: WidgetCore) -> Self {
        Self { core }
    }

    fn background(&self) -> Markup {
        let record = &self.core.record;
        let bounds = record.bounds();
        svg_frame(&bounds)
            .attr("data-channel", &record.channel)
            .child(rect(
                0.0,
                0.0,
                bounds.width,
                bounds.height,
                0.0,
                &record.text("colour"),
            ))
            .into()
    }
}

impl Widget for Form {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    /// Canvas background only; child widgets are rendered separately.
    fn render(&self) -> Markup {
        self.background()
    }

    /// Background markup meant to replace the existing node without
    /// touching children attached beneath it.
    fn refresh(&self) -> Option<Markup> {
        Some(self.background())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WidgetRecord;
    use expect_test::expect;
    use serde_json::json;

    #[test]
    fn form_renders_background_from_size() {
        let record = WidgetRecord::from_value(json!({
            "type": "form",
            "caption": "Synth",
            "size": {"width": 400, "height": 200},
            "colour": "#202020"
        }))
        .unwrap();
        let form = Form::new(WidgetCore::new(record));
        expect![[r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 200" width="100%" height="100%" preserveAspectRatio="none" data-channel="MainForm"><rect x="0" y="0" width="400" height="200" rx="0" ry="0" fill="#202020"/></svg>"##]]
            .assert_eq(&form.render().to_svg());
        assert_eq!(form.refresh(), Some(form.render()));
    }
}
