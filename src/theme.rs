use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_text_color: String,
    pub node_border_color: String,
    pub man_fill: String,
    pub woman_fill: String,
    pub lineage_color: String,
    pub marriage_color: String,
    pub divorced_color: String,
    pub background: String,
}

impl Theme {
    /// Palette close to the classic dTree stylesheet.
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            node_fill: "#FFFFFF".to_string(),
            node_text_color: "#333333".to_string(),
            node_border_color: "#333333".to_string(),
            man_fill: "#DDEEFF".to_string(),
            woman_fill: "#FFE4E8".to_string(),
            lineage_color: "#333333".to_string(),
            marriage_color: "#333333".to_string(),
            divorced_color: "#999999".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_text_color: "#1C2430".to_string(),
            node_border_color: "#C7D2E5".to_string(),
            man_fill: "#EAF2FF".to_string(),
            woman_fill: "#FFF0F3".to_string(),
            lineage_color: "#7A8AA6".to_string(),
            marriage_color: "#7A8AA6".to_string(),
            divorced_color: "#C0C8D6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "dtree" => Some(Self::classic()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
