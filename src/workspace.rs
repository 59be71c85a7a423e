//! Workspace - the root container of an edited program
//!
//! The workspace owns the top-level [`BlockSequence`], the schema registry
//! handle and the layout metrics. It translates view coordinates into
//! sequence coordinates for every pointer-driven operation and reports the
//! serialized program to an optional change listener after each mutation.
//!
//! A drag gesture is a [`DragSession`]: the block is detached when the drag
//! begins and either dropped at a new position or restored to its origin.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::registry::SchemaRegistry;
use crate::core::schema::ValueType;
use crate::core::ContainerId;
use crate::layout::{Canvas, LayoutMetrics};
use crate::tree::{BlockNode, BlockSequence, Container, TreeError, TreePath};

/// Blank space around the program inside the view
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPadding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ViewPadding {
    pub fn uniform(padding: f32) -> Self {
        Self {
            left: padding,
            top: padding,
            right: padding,
            bottom: padding,
        }
    }
}

type ChangeListener = Box<dyn FnMut(&Value)>;

/// Root container of a block program
pub struct Workspace {
    id: ContainerId,
    registry: SchemaRegistry,
    metrics: Arc<dyn LayoutMetrics>,
    code: BlockSequence,
    padding: ViewPadding,
    width: f32,
    height: f32,
    last_state: Value,
    on_change: Option<ChangeListener>,
}

impl Workspace {
    /// Create an empty workspace
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use block_editor::core::registry::SchemaRegistry;
    /// use block_editor::layout::MonospaceMetrics;
    /// use block_editor::workspace::Workspace;
    ///
    /// let workspace = Workspace::new(SchemaRegistry::new(), Arc::new(MonospaceMetrics::default()));
    /// assert!(workspace.code().is_empty());
    /// assert_eq!(workspace.state(), serde_json::json!([]));
    /// ```
    pub fn new(registry: SchemaRegistry, metrics: Arc<dyn LayoutMetrics>) -> Self {
        let mut workspace = Self {
            id: ContainerId::new(),
            registry,
            metrics,
            code: BlockSequence::new(),
            padding: ViewPadding::default(),
            width: 0.0,
            height: 0.0,
            last_state: Value::Array(Vec::new()),
            on_change: None,
        };
        workspace.relayout();
        workspace
    }

    pub fn with_padding(mut self, padding: ViewPadding) -> Self {
        self.padding = padding;
        self.relayout();
        self
    }

    /// Install the listener receiving the serialized program after each change
    pub fn on_change(&mut self, listener: impl FnMut(&Value) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &dyn LayoutMetrics {
        self.metrics.as_ref()
    }

    pub fn code(&self) -> &BlockSequence {
        &self.code
    }

    pub fn padding(&self) -> ViewPadding {
        self.padding
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Swap the layout metrics and recompute every cached size
    pub fn set_metrics(&mut self, metrics: Arc<dyn LayoutMetrics>) {
        self.metrics = metrics;
        self.code.relayout(self.metrics.as_ref());
        self.relayout();
    }

    // ── Program state ───────────────────────────────────────────────────────

    /// Serialized program: an array of top-level node objects
    pub fn state(&self) -> Value {
        self.code.to_json()
    }

    /// Replace the program with a serialized one
    ///
    /// Loading is atomic: on error the current program stays untouched. No
    /// change is reported for the loaded state itself.
    pub fn load(&mut self, state: &Value) -> Result<(), TreeError> {
        let code = BlockSequence::from_json(state, &self.registry, self.id, self.metrics.as_ref())?;
        debug!(blocks = code.len(), "program loaded");
        self.code = code;
        self.relayout();
        self.last_state = self.state();
        Ok(())
    }

    /// Parse and load a serialized program. See [`Workspace::load`].
    pub fn load_str(&mut self, json: &str) -> Result<(), TreeError> {
        let state: Value =
            serde_json::from_str(json).map_err(|e| TreeError::MalformedInput(e.to_string()))?;
        self.load(&state)
    }

    /// Append a fresh instance of a registered schema to the program
    pub fn add_block(&mut self, schema_id: &str) -> Result<(), TreeError> {
        let schema = self
            .registry
            .lookup(schema_id)
            .ok_or_else(|| TreeError::UnknownSchema(schema_id.to_string()))?;
        let node = BlockNode::new(schema, self.metrics.as_ref());
        self.code.push(node, self.id);
        debug!(schema = schema_id, "block added");
        self.changed();
        Ok(())
    }

    // ── Pointer operations ──────────────────────────────────────────────────

    /// View coordinates → root sequence coordinates
    fn to_code_space(&self, x: f32, y: f32) -> (f32, f32) {
        let config = self.metrics.config();
        (
            x - self.padding.left - config.element_padding_horizontal,
            y - self.padding.top - config.element_padding_vertical,
        )
    }

    /// Detach the block under the point
    pub fn remove_at(&mut self, x: f32, y: f32) -> Option<BlockNode> {
        self.begin_drag(x, y).map(|session| session.node)
    }

    /// Drop a block at the point. A drop always lands somewhere.
    pub fn insert_at(&mut self, node: BlockNode, x: f32, y: f32) {
        let (x, y) = self.to_code_space(x, y);
        debug!(schema = node.schema_id(), x, y, "dropping block");
        self.code.insert_at(node, x, y, self.id, self.metrics.as_ref());
        self.changed();
    }

    pub fn value_type_at(&self, x: f32, y: f32) -> ValueType {
        let (x, y) = self.to_code_space(x, y);
        self.code.value_type_at(x, y, self.metrics.as_ref())
    }

    pub fn value_at(&self, x: f32, y: f32) -> Option<&str> {
        let (x, y) = self.to_code_space(x, y);
        self.code.value_at(x, y, self.metrics.as_ref())
    }

    /// Set the literal of the socket under the point
    pub fn set_value_at(&mut self, value: &str, x: f32, y: f32) -> bool {
        let (x, y) = self.to_code_space(x, y);
        let updated = self.code.set_value_at(value, x, y, self.metrics.as_ref());
        if updated {
            self.changed();
        }
        updated
    }

    /// Start dragging the block under the point
    ///
    /// # Returns
    /// * `Some(DragSession)` holding the detached block and its origin
    /// * `None` if nothing removable is under the point
    pub fn begin_drag(&mut self, x: f32, y: f32) -> Option<DragSession> {
        let (x, y) = self.to_code_space(x, y);
        let detached = self.code.take_at(x, y, self.metrics.as_ref())?;
        self.changed();
        Some(DragSession {
            node: detached.node,
            origin: detached.origin,
        })
    }

    /// Paint the program
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let config = self.metrics.config();
        self.code.draw(
            canvas,
            self.metrics.as_ref(),
            self.padding.top + config.element_padding_vertical,
            self.padding.left + config.element_padding_horizontal,
        );
    }

    // ── Change tracking ─────────────────────────────────────────────────────

    fn relayout(&mut self) {
        let metrics = Arc::clone(&self.metrics);
        self.recalculate_size(metrics.as_ref());
    }

    fn changed(&mut self) {
        self.relayout();
        let state = self.state();
        if state == self.last_state {
            return;
        }
        self.last_state = state;
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.last_state);
        }
    }
}

impl Container for Workspace {
    fn recalculate_size(&mut self, metrics: &dyn LayoutMetrics) -> bool {
        let config = metrics.config();
        let width = self.code.width()
            + self.padding.left
            + self.padding.right
            + 2.0 * config.element_padding_horizontal;
        let height = self.code.height(metrics)
            + self.padding.top
            + self.padding.bottom
            + 2.0 * config.element_padding_vertical;
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        changed
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("blocks", &self.code.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A block held by an in-progress drag
#[derive(Debug)]
pub struct DragSession {
    node: BlockNode,
    origin: TreePath,
}

impl DragSession {
    /// The held block
    pub fn node(&self) -> &BlockNode {
        &self.node
    }

    /// Where the block was picked up
    pub fn origin(&self) -> &TreePath {
        &self.origin
    }

    /// Finish the drag by dropping the block at the point
    pub fn drop_at(self, workspace: &mut Workspace, x: f32, y: f32) {
        workspace.insert_at(self.node, x, y);
    }

    /// Abort the drag, putting the block back where it was picked up
    ///
    /// If the origin no longer exists the block is appended to the program.
    pub fn cancel(self, workspace: &mut Workspace) {
        let metrics = Arc::clone(&workspace.metrics);
        let parent = workspace.id;
        if let Err(node) = workspace
            .code
            .restore(&self.origin, self.node, parent, metrics.as_ref())
        {
            debug!(schema = node.schema_id(), "drag origin vanished, appending");
            workspace.code.push(node, parent);
        }
        workspace.changed();
    }

    /// Give up ownership of the held block
    pub fn into_node(self) -> BlockNode {
        self.node
    }
}
