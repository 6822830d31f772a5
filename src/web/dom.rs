//! [`Surface`] over the live browser document.

use crate::{
    error::{Result, SwimlaneError},
    ui::{Point, PressTarget, Rect, Surface},
    web::DomClasses,
};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

/// Inline styles `lift` applies and `settle` clears
const LIFT_PROPERTIES: [&str; 7] = [
    "position",
    "z-index",
    "left",
    "top",
    "width",
    "cursor",
    "pointer-events",
];

const OPEN_LINK_LABEL: &str = "+ Add card";
const PREVIOUS_LABEL_ATTR: &str = "data-prev-text";

fn surface_error(context: &str, err: JsValue) -> SwimlaneError {
    SwimlaneError::SurfaceError(format!("{}: {:?}", context, err))
}

pub struct DomSurface {
    document: Document,
    classes: DomClasses,
}

impl DomSurface {
    pub fn new(document: Document, classes: DomClasses) -> Self {
        Self { document, classes }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn classes(&self) -> &DomClasses {
        &self.classes
    }

    /// Nearest ancestor-or-self carrying `class`
    pub fn closest(&self, node: &Element, class: &str) -> Option<Element> {
        node.closest(&DomClasses::selector(class)).ok().flatten()
    }

    fn query(&self, root: &Element, class: &str) -> Option<Element> {
        root.query_selector(&DomClasses::selector(class)).ok().flatten()
    }

    fn query_all(&self, root: Option<&Element>, selector: &str) -> Vec<Element> {
        let list = match root {
            Some(root) => root.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        let list = match list {
            Ok(list) => list,
            Err(err) => {
                warn!(selector, error = ?err, "selector query failed");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|err| surface_error("create element", err))?;
        element.set_class_name(class);
        Ok(element)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            if let Err(err) = html.style().set_property(property, value) {
                warn!(property, error = ?err, "failed to set style");
            }
        }
    }

    fn clear_style(&self, element: &Element, property: &str) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.style().remove_property(property);
        }
    }

    fn set_body_cursor(&self, cursor: Option<&str>) {
        if let Some(body) = self.document.body() {
            match cursor {
                Some(cursor) => self.set_style(&body, "cursor", cursor),
                None => self.clear_style(&body, "cursor"),
            }
        }
    }

    /// Current text of a column's composer input
    pub fn composer_text(&self, column: &Element) -> Option<String> {
        let container = self.query(column, &self.classes.input_container)?;
        let input = self.query(&container, &self.classes.input)?;
        input
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| input.value())
    }

    fn build_composer(&self) -> Result<(Element, Element)> {
        let container = self.create("div", &self.classes.input_container)?;
        let input = self.create("input", &self.classes.input)?;
        let attrs = [("type", "text"), ("placeholder", "Enter a title for this card...")];
        for (name, value) in attrs {
            input
                .set_attribute(name, value)
                .map_err(|err| surface_error("composer input", err))?;
        }

        let add = self.create("button", &self.classes.add_button)?;
        add.set_text_content(Some("Add Card"));
        add.set_attribute("type", "button")
            .map_err(|err| surface_error("composer button", err))?;

        let cancel = self.create("span", &self.classes.delete)?;
        cancel.set_text_content(Some("✖"));
        cancel
            .set_attribute("aria-label", "Cancel")
            .map_err(|err| surface_error("composer cancel", err))?;

        for child in [&input, &add, &cancel] {
            container
                .append_child(child)
                .map_err(|err| surface_error("composer layout", err))?;
        }
        Ok((container, input))
    }
}

impl Surface for DomSurface {
    type Node = Element;

    fn create_card(&mut self, text: &str) -> Result<Element> {
        let card = self.create("div", &self.classes.card)?;
        card.append_child(&self.document.create_text_node(text))
            .map_err(|err| surface_error("card text", err))?;

        let delete = self.create("span", &self.classes.delete)?;
        delete.set_text_content(Some("✖"));
        delete
            .set_attribute("aria-label", "Delete card")
            .map_err(|err| surface_error("delete affordance", err))?;
        card.append_child(&delete)
            .map_err(|err| surface_error("delete affordance", err))?;
        Ok(card)
    }

    fn create_placeholder(&mut self, height: f64) -> Result<Element> {
        let placeholder = self.create("div", &self.classes.placeholder)?;
        self.set_style(&placeholder, "height", &format!("{}px", height));
        Ok(placeholder)
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn insert_before(&mut self, parent: &Element, node: &Element, reference: Option<&Element>) {
        if let Err(err) = parent.insert_before(node, reference.map(|reference| &**reference)) {
            warn!(error = ?err, "insertBefore failed");
        }
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }

    fn add_affordance(&self, column: &Element) -> Option<Element> {
        self.query(column, &self.classes.add_link)
    }

    fn card_nodes(&self, column: &Element) -> Vec<Element> {
        let selector = format!(
            "{}:not({})",
            DomClasses::selector(&self.classes.card),
            DomClasses::selector(&self.classes.dragged)
        );
        self.query_all(Some(column), &selector)
    }

    fn bounding_box(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn column_at(&self, point: Point) -> Option<Element> {
        let hit = self
            .document
            .element_from_point(point.x as f32, point.y as f32)?;
        self.closest(&hit, &self.classes.column)
    }

    fn classify_press(&self, target: &Element) -> PressTarget<Element> {
        if self.closest(target, &self.classes.input_container).is_some()
            || self.closest(target, &self.classes.add_button).is_some()
            || self.closest(target, &self.classes.input).is_some()
        {
            return PressTarget::ComposerControl;
        }
        let card = self.closest(target, &self.classes.card);
        if self.closest(target, &self.classes.delete).is_some() {
            return match card {
                Some(card) => PressTarget::DeleteAffordance(card),
                None => PressTarget::Other,
            };
        }
        match card {
            Some(card) => PressTarget::Card(card),
            None => PressTarget::Other,
        }
    }

    fn lift(&mut self, card: &Element, rect: Rect) {
        let _ = card.class_list().add_1(&self.classes.dragged);
        self.set_style(card, "width", &format!("{}px", rect.width));
        self.set_style(card, "position", "absolute");
        self.set_style(card, "z-index", "1000");
        self.set_style(card, "cursor", "grabbing");
        self.set_style(card, "pointer-events", "none");
        self.set_body_cursor(Some("grabbing"));

        match self.document.body() {
            Some(body) => {
                if let Err(err) = body.append_child(card) {
                    warn!(error = ?err, "failed to float dragged card");
                }
            }
            None => warn!("document has no body; dragged card stays in place"),
        }
    }

    fn move_lifted(&mut self, card: &Element, top_left: Point) {
        self.set_style(card, "left", &format!("{}px", top_left.x));
        self.set_style(card, "top", &format!("{}px", top_left.y));
    }

    fn settle(&mut self, card: &Element) {
        let _ = card.class_list().remove_1(&self.classes.dragged);
        for property in LIFT_PROPERTIES {
            self.clear_style(card, property);
        }
        self.set_body_cursor(None);
    }

    fn remove_orphan_placeholders(&mut self) -> usize {
        let orphans = self.query_all(None, &DomClasses::selector(&self.classes.placeholder));
        for placeholder in &orphans {
            placeholder.remove();
        }
        orphans.len()
    }

    fn open_composer(&mut self, column: &Element) {
        if let Some(container) = self.query(column, &self.classes.input_container) {
            if let Some(input) = self.query(&container, &self.classes.input) {
                if let Ok(input) = input.dyn_into::<HtmlElement>() {
                    let _ = input.focus();
                }
            }
            return;
        }

        let (container, input) = match self.build_composer() {
            Ok(parts) => parts,
            Err(err) => {
                warn!(error = %err, "failed to build add-card input");
                return;
            }
        };
        let link = self.add_affordance(column);
        self.insert_before(column, &container, link.as_ref());

        if let Some(link) = link {
            let label = link.text_content().unwrap_or_default();
            let _ = link.set_attribute(PREVIOUS_LABEL_ATTR, &label);
            link.set_text_content(Some(OPEN_LINK_LABEL));
            let _ = link.set_attribute("aria-expanded", "true");
            self.set_style(&link, "pointer-events", "none");
            self.set_style(&link, "opacity", "0.6");
        }
        if let Ok(input) = input.dyn_into::<HtmlElement>() {
            let _ = input.focus();
        }
    }

    fn close_composer(&mut self, column: &Element) {
        if let Some(container) = self.query(column, &self.classes.input_container) {
            container.remove();
        }
        if let Some(link) = self.add_affordance(column) {
            if let Some(label) = link.get_attribute(PREVIOUS_LABEL_ATTR) {
                link.set_text_content(Some(&label));
                let _ = link.remove_attribute(PREVIOUS_LABEL_ATTR);
            }
            let _ = link.remove_attribute("aria-expanded");
            self.clear_style(&link, "pointer-events");
            self.clear_style(&link, "opacity");
        }
    }
}
