/// Drawing surface identity and logical size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            id: "GridVisualizer".to_string(),
            width: 960,
            height: 540,
        }
    }
}
