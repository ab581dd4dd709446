use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct EditorProps {
    /// Template loaded on first render.
    pub template_id: String,
    /// Asks the parent to show the list again.
    pub on_close: Callback<()>,
}
