use crate::viewport::ViewportState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    Center,
    SpaceBetween,
    FlexEnd,
}

/// Style parameters of the site footer for one viewport.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLayout {
    pub direction: FlexDirection,
    pub justify: Justify,
    pub padding: &'static str,
    pub gap_px: u32,
    pub min_height_px: Option<u32>,
    pub logo_width_px: u32,
    pub logo_height_px: u32,
    pub icon_size_px: u32,
    pub icon_gap_px: u32,
    pub icons_justify: Justify,
    pub link_gap_px: u32,
    pub link_font_size_px: u32,
}

impl FooterLayout {
    pub fn for_viewport(viewport: &ViewportState) -> Self {
        let mobile = viewport.is_mobile;
        let tiny = viewport.is_extra_small;

        Self {
            direction: if mobile {
                FlexDirection::Column
            } else {
                FlexDirection::Row
            },
            justify: if mobile {
                Justify::Center
            } else {
                Justify::SpaceBetween
            },
            padding: match (mobile, tiny) {
                (true, true) => "16px 8px",
                (true, false) => "20px 24px",
                (false, _) => "32px 124px 24px",
            },
            gap_px: if mobile { 12 } else { 32 },
            min_height_px: (!mobile).then_some(97),
            logo_width_px: if tiny { 70 } else { 88 },
            logo_height_px: if tiny { 21 } else { 27 },
            icon_size_px: if tiny { 16 } else { 18 },
            icon_gap_px: if tiny { 15 } else { 18 },
            icons_justify: if mobile {
                Justify::Center
            } else {
                Justify::FlexEnd
            },
            link_gap_px: match (mobile, tiny) {
                (true, true) => 8,
                (true, false) => 10,
                (false, _) => 12,
            },
            link_font_size_px: if tiny { 12 } else { 14 },
        }
    }
}
