/*!
 * Simulated Host
 * In-memory stand-in for the embedding environment
 *
 * Serves as the test double for every detection and transition scenario and
 * as a reference for real host adapters. Behavior is scripted per instance:
 * frame access can be granted, silently nulled, or made to fault; attribute
 * operations can fault, no-op, or rewrite written values the way normalizing
 * hosts do.
 */

use super::traits::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Shared = Rc<RefCell<SimState>>;

/// How the host answers a frame-reference request.
#[derive(Clone)]
pub enum FrameAccess {
    /// Return a live frame handle.
    Granted,
    /// Return no reference and raise nothing (the silent cross-origin null).
    SilentNull,
    /// Raise the given fault.
    Faulting(HostFault),
}

/// How the host answers an origin-handle read.
#[derive(Clone)]
pub enum OriginAccess {
    Readable(Option<String>),
    Faulting(HostFault),
}

struct SimState {
    opener: bool,
    top_differs: bool,
    parent_differs: bool,
    frame_access: FrameAccess,
    origin: OriginAccess,
    tag_name: String,
    is_element: bool,
    // node id -> attribute pairs in set order
    attrs: BTreeMap<u64, Vec<(String, String)>>,
    live_frame: u64,
    next_node: u64,
    read_fault: Option<HostFault>,
    write_fault: Option<HostFault>,
    remove_fault: Option<HostFault>,
    removal_is_noop: bool,
    write_rewrite: Option<Box<dyn Fn(&str) -> String>>,
    // armed after a write to the live frame's sandbox attribute
    read_fault_after_write: Option<HostFault>,
    clear_origin_after_write: bool,
    has_parent: bool,
    has_document: bool,
    replace_returns_wrong_node: bool,
    replacements: Vec<(u64, u64)>,
    mutations: u32,
}

impl SimState {
    fn fresh() -> Self {
        Self {
            opener: false,
            top_differs: false,
            parent_differs: false,
            frame_access: FrameAccess::Granted,
            origin: OriginAccess::Readable(Some("example.test".into())),
            tag_name: "IFRAME".into(),
            is_element: true,
            attrs: BTreeMap::from([(1, Vec::new())]),
            live_frame: 1,
            next_node: 2,
            read_fault: None,
            write_fault: None,
            remove_fault: None,
            removal_is_noop: false,
            write_rewrite: None,
            read_fault_after_write: None,
            clear_origin_after_write: false,
            has_parent: true,
            has_document: true,
            replace_returns_wrong_node: false,
            replacements: Vec::new(),
            mutations: 0,
        }
    }
}

/// Scriptable host environment. Clones share state, so a test can keep a
/// handle for scripting and inspection after moving one into a controller.
#[derive(Clone)]
pub struct SimHost {
    state: Shared,
}

impl SimHost {
    /// A top-level context: no ancestors, no opener.
    pub fn unframed() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState::fresh())),
        }
    }

    /// A same-origin embedded context with a reachable frame element and no
    /// sandbox attribute.
    pub fn framed() -> Self {
        let host = Self::unframed();
        host.state.borrow_mut().top_differs = true;
        host.state.borrow_mut().parent_differs = true;
        host
    }

    /// A same-origin embedded context whose frame carries the given sandbox
    /// attribute value.
    pub fn framed_sandboxed(tokens: &str) -> Self {
        let host = Self::framed();
        {
            let mut st = host.state.borrow_mut();
            let live = st.live_frame;
            if let Some(attrs) = st.attrs.get_mut(&live) {
                attrs.push(("sandbox".into(), tokens.into()));
            }
        }
        host
    }

    /// A cross-origin embedded context on a host that nulls the frame
    /// reference silently.
    pub fn cross_origin_silent() -> Self {
        let host = Self::framed();
        host.state.borrow_mut().frame_access = FrameAccess::SilentNull;
        host
    }

    /// A cross-origin embedded context on a host that raises for the frame
    /// reference.
    pub fn cross_origin_faulting(fault: HostFault) -> Self {
        let host = Self::framed();
        host.state.borrow_mut().frame_access = FrameAccess::Faulting(fault);
        host
    }

    // Scripting knobs

    pub fn set_opener(&self, opener: bool) {
        self.state.borrow_mut().opener = opener;
    }

    pub fn set_frame_access(&self, access: FrameAccess) {
        self.state.borrow_mut().frame_access = access;
    }

    pub fn set_origin(&self, origin: OriginAccess) {
        self.state.borrow_mut().origin = origin;
    }

    pub fn set_tag_name(&self, tag: &str) {
        self.state.borrow_mut().tag_name = tag.into();
    }

    pub fn set_element(&self, is_element: bool) {
        self.state.borrow_mut().is_element = is_element;
    }

    pub fn fail_attribute_reads(&self, fault: HostFault) {
        self.state.borrow_mut().read_fault = Some(fault);
    }

    pub fn fail_attribute_writes(&self, fault: HostFault) {
        self.state.borrow_mut().write_fault = Some(fault);
    }

    pub fn pass_attribute_writes(&self) {
        self.state.borrow_mut().write_fault = None;
    }

    pub fn fail_attribute_removal(&self, fault: HostFault) {
        self.state.borrow_mut().remove_fault = Some(fault);
    }

    /// Removal calls return cleanly but leave the attribute in place.
    pub fn make_removal_noop(&self) {
        self.state.borrow_mut().removal_is_noop = true;
    }

    /// Rewrite every written attribute value, the way hosts that normalize
    /// or filter sandbox tokens do.
    pub fn rewrite_writes(&self, f: impl Fn(&str) -> String + 'static) {
        self.state.borrow_mut().write_rewrite = Some(Box::new(f));
    }

    /// After the next sandbox-attribute write, attribute reads raise.
    pub fn fail_reads_after_write(&self, fault: HostFault) {
        self.state.borrow_mut().read_fault_after_write = Some(fault);
    }

    /// After the next sandbox-attribute write, the origin handle reads empty.
    pub fn clear_origin_after_write(&self) {
        self.state.borrow_mut().clear_origin_after_write = true;
    }

    pub fn drop_parent(&self) {
        self.state.borrow_mut().has_parent = false;
    }

    pub fn drop_document(&self) {
        self.state.borrow_mut().has_document = false;
    }

    /// Child replacement reports a node other than the one displaced.
    pub fn replace_reports_wrong_node(&self) {
        self.state.borrow_mut().replace_returns_wrong_node = true;
    }

    // Inspection

    /// Current value of an attribute on the live frame.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let st = self.state.borrow();
        st.attrs
            .get(&st.live_frame)
            .and_then(|a| a.iter().find(|(n, _)| n == name))
            .map(|(_, v)| v.clone())
    }

    /// Total attribute mutations (sets and removals) issued so far.
    pub fn mutation_count(&self) -> u32 {
        self.state.borrow().mutations
    }

    /// Completed child replacements as (displaced, replacement) node ids.
    pub fn replacement_count(&self) -> usize {
        self.state.borrow().replacements.len()
    }
}

impl HostWindow for SimHost {
    type Frame = SimFrame;
    type Parent = SimParent;
    type Document = SimDocument;

    fn frame_element(&self) -> HostResult<Option<SimFrame>> {
        let access = self.state.borrow().frame_access.clone();
        match access {
            FrameAccess::Granted => {
                let node = self.state.borrow().live_frame;
                Ok(Some(SimFrame {
                    node,
                    state: Rc::clone(&self.state),
                }))
            }
            FrameAccess::SilentNull => Ok(None),
            FrameAccess::Faulting(fault) => Err(fault),
        }
    }

    fn has_opener(&self) -> bool {
        self.state.borrow().opener
    }

    fn top_differs(&self) -> bool {
        self.state.borrow().top_differs
    }

    fn parent_differs(&self) -> bool {
        self.state.borrow().parent_differs
    }

    fn script_origin(&self) -> HostResult<Option<String>> {
        match self.state.borrow().origin.clone() {
            OriginAccess::Readable(origin) => Ok(origin),
            OriginAccess::Faulting(fault) => Err(fault),
        }
    }
}

/// Handle onto a simulated frame element.
#[derive(Clone)]
pub struct SimFrame {
    node: u64,
    state: Shared,
}

impl SimFrame {
    fn read_guard(&self) -> Result<(), HostFault> {
        match &self.state.borrow().read_fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

impl FrameElement for SimFrame {
    type Parent = SimParent;

    fn is_element(&self) -> bool {
        self.state.borrow().is_element
    }

    fn tag_name(&self) -> String {
        self.state.borrow().tag_name.clone()
    }

    fn same_node(&self, other: &Self) -> bool {
        self.node == other.node
    }

    fn has_attribute(&self, name: &str) -> HostResult<bool> {
        self.read_guard()?;
        let st = self.state.borrow();
        Ok(st
            .attrs
            .get(&self.node)
            .is_some_and(|a| a.iter().any(|(n, _)| n == name)))
    }

    fn get_attribute(&self, name: &str) -> HostResult<Option<String>> {
        self.read_guard()?;
        let st = self.state.borrow();
        Ok(st
            .attrs
            .get(&self.node)
            .and_then(|a| a.iter().find(|(n, _)| n == name))
            .map(|(_, v)| v.clone()))
    }

    fn set_attribute(&self, name: &str, value: &str) -> HostResult<()> {
        let mut st = self.state.borrow_mut();
        st.mutations += 1;
        if let Some(fault) = &st.write_fault {
            return Err(fault.clone());
        }
        let stored = match &st.write_rewrite {
            Some(rewrite) => rewrite(value),
            None => value.to_string(),
        };
        let entry = st.attrs.entry(self.node).or_default();
        match entry.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = stored,
            None => entry.push((name.to_string(), stored)),
        }
        // A sandbox write may have locked this context down
        if name == "sandbox" && self.node == st.live_frame {
            if let Some(fault) = st.read_fault_after_write.take() {
                st.read_fault = Some(fault);
            }
            if st.clear_origin_after_write {
                st.origin = OriginAccess::Readable(None);
            }
        }
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> HostResult<()> {
        let mut st = self.state.borrow_mut();
        st.mutations += 1;
        if let Some(fault) = &st.remove_fault {
            return Err(fault.clone());
        }
        if !st.removal_is_noop {
            if let Some(entry) = st.attrs.get_mut(&self.node) {
                entry.retain(|(n, _)| n != name);
            }
        }
        Ok(())
    }

    fn attributes(&self) -> HostResult<Vec<(String, String)>> {
        self.read_guard()?;
        let st = self.state.borrow();
        Ok(st.attrs.get(&self.node).cloned().unwrap_or_default())
    }

    fn parent_node(&self) -> HostResult<Option<SimParent>> {
        let st = self.state.borrow();
        Ok(st.has_parent.then(|| SimParent {
            state: Rc::clone(&self.state),
        }))
    }
}

/// The simulated parent node of the live frame.
pub struct SimParent {
    state: Shared,
}

impl ParentNode for SimParent {
    type Frame = SimFrame;
    type Document = SimDocument;

    fn owner_document(&self) -> Option<SimDocument> {
        let st = self.state.borrow();
        st.has_document.then(|| SimDocument {
            state: Rc::clone(&self.state),
        })
    }

    fn replace_child(
        &self,
        replacement: SimFrame,
        displaced: &SimFrame,
    ) -> HostResult<SimFrame> {
        let mut st = self.state.borrow_mut();
        st.replacements.push((displaced.node, replacement.node));
        st.live_frame = replacement.node;
        let reported = if st.replace_returns_wrong_node {
            let node = st.next_node;
            st.next_node += 1;
            node
        } else {
            displaced.node
        };
        Ok(SimFrame {
            node: reported,
            state: Rc::clone(&self.state),
        })
    }
}

/// The simulated owning document.
pub struct SimDocument {
    state: Shared,
}

impl DocumentHandle for SimDocument {
    type Frame = SimFrame;

    fn create_frame(&self) -> HostResult<SimFrame> {
        let mut st = self.state.borrow_mut();
        let node = st.next_node;
        st.next_node += 1;
        st.attrs.insert(node, Vec::new());
        Ok(SimFrame {
            node,
            state: Rc::clone(&self.state),
        })
    }
}
