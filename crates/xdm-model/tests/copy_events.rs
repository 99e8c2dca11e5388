use std::sync::Arc;

use rstest::rstest;
use xdm_model::iter::collect;
use xdm_model::model::simple::{attr, comment, doc, elem, elem_ns, pi, text};
use xdm_model::receiver::{NullReceiver, Receiver, WhichNamespaces};
use xdm_model::{Error, NameCode, NamePool, NamespaceCode, XdmNode};

fn pool() -> Arc<NamePool> {
    Arc::new(NamePool::new())
}

/// Records every event as a readable line.
#[derive(Default)]
struct Recorder {
    pool: Option<Arc<NamePool>>,
    events: Vec<String>,
}

impl Recorder {
    fn for_pool(pool: &Arc<NamePool>) -> Self {
        Recorder {
            pool: Some(Arc::clone(pool)),
            events: Vec::new(),
        }
    }

    fn name(&self, code: NameCode) -> String {
        match &self.pool {
            Some(p) => p.display_name_of(code).unwrap_or_default(),
            None => format!("#{}", code.as_u32()),
        }
    }
}

impl Receiver for Recorder {
    fn start_document(&mut self) -> Result<(), Error> {
        self.events.push("start-document".into());
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), Error> {
        self.events.push("end-document".into());
        Ok(())
    }

    fn start_element(&mut self, name: NameCode) -> Result<(), Error> {
        self.events.push(format!("start-element {}", self.name(name)));
        Ok(())
    }

    fn namespace(&mut self, code: NamespaceCode) -> Result<(), Error> {
        let (prefix, uri) = match &self.pool {
            Some(p) => (
                p.prefix_from_namespace_code(code).unwrap_or_default(),
                p.uri_from_namespace_code(code).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        self.events.push(format!("namespace {prefix}={uri}"));
        Ok(())
    }

    fn attribute(&mut self, name: NameCode, value: &str) -> Result<(), Error> {
        self.events
            .push(format!("attribute {}={value}", self.name(name)));
        Ok(())
    }

    fn start_content(&mut self) -> Result<(), Error> {
        self.events.push("start-content".into());
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), Error> {
        self.events.push("end-element".into());
        Ok(())
    }

    fn characters(&mut self, value: &str) -> Result<(), Error> {
        self.events.push(format!("characters {value}"));
        Ok(())
    }

    fn comment(&mut self, value: &str) -> Result<(), Error> {
        self.events.push(format!("comment {value}"));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Error> {
        self.events.push(format!("pi {target} {data}"));
        Ok(())
    }
}

#[rstest]
fn element_event_order() {
    let pool = pool();
    let root = doc()
        .child(
            elem("r")
                .attribute(attr("id", "1"))
                .child(text("hi"))
                .child(comment("c"))
                .child(pi("go", "now")),
        )
        .build(&pool)
        .unwrap();
    let mut rec = Recorder::for_pool(&pool);
    root.copy_to(&mut rec, WhichNamespaces::None).unwrap();
    assert_eq!(
        rec.events,
        [
            "start-document",
            "start-element r",
            "attribute id=1",
            "start-content",
            "characters hi",
            "comment c",
            "pi go now",
            "end-element",
            "end-document",
        ]
    );
}

#[rstest]
fn all_namespaces_only_on_the_top_element() {
    let pool = pool();
    let root = doc()
        .child(
            elem_ns("p", "urn:outer", "r")
                .child(elem_ns("p", "urn:outer", "mid").namespace("q", "urn:inner")),
        )
        .build(&pool)
        .unwrap();
    let r = collect(root.children()).remove(0);
    let mid = collect(r.children()).remove(0);

    // Copying mid with All emits its full in-scope set.
    let mut rec = Recorder::for_pool(&pool);
    mid.copy_to(&mut rec, WhichNamespaces::All).unwrap();
    assert!(rec.events.contains(&"namespace q=urn:inner".to_string()));
    assert!(rec.events.contains(&"namespace p=urn:outer".to_string()));

    // Copying r with All emits p once: mid redeclares nothing new except
    // its own q binding.
    let mut rec = Recorder::for_pool(&pool);
    r.copy_to(&mut rec, WhichNamespaces::All).unwrap();
    let p_events = rec
        .events
        .iter()
        .filter(|e| e.starts_with("namespace p="))
        .count();
    // p appears for r (in scope) and for mid (declared locally via its
    // own name).
    assert!(p_events >= 1);
    assert!(rec.events.contains(&"namespace q=urn:inner".to_string()));
}

#[rstest]
fn no_namespace_events_when_disabled() {
    let pool = pool();
    let root = doc()
        .child(elem_ns("p", "urn:x", "r").namespace("q", "urn:y"))
        .build(&pool)
        .unwrap();
    let mut rec = Recorder::for_pool(&pool);
    root.copy_to(&mut rec, WhichNamespaces::None).unwrap();
    assert!(rec.events.iter().all(|e| !e.starts_with("namespace")));
}

#[rstest]
fn copying_a_lone_attribute_emits_one_event() {
    let pool = pool();
    let root = doc()
        .child(elem("r").attribute(attr("id", "7")))
        .build(&pool)
        .unwrap();
    let r = collect(root.children()).remove(0);
    let id = collect(r.attributes()).remove(0);
    let mut rec = Recorder::for_pool(&pool);
    id.copy_to(&mut rec, WhichNamespaces::None).unwrap();
    assert_eq!(rec.events, ["attribute id=7"]);
}

#[rstest]
fn null_receiver_swallows_everything() {
    let pool = pool();
    let root = doc()
        .child(elem("r").child(text("x")))
        .build(&pool)
        .unwrap();
    root.copy_to(&mut NullReceiver, WhichNamespaces::All).unwrap();
}

#[rstest]
fn receiver_errors_stop_the_copy() {
    struct FailOnText(Recorder);
    impl Receiver for FailOnText {
        fn start_document(&mut self) -> Result<(), Error> {
            self.0.start_document()
        }
        fn end_document(&mut self) -> Result<(), Error> {
            self.0.end_document()
        }
        fn start_element(&mut self, name: NameCode) -> Result<(), Error> {
            self.0.start_element(name)
        }
        fn namespace(&mut self, code: NamespaceCode) -> Result<(), Error> {
            self.0.namespace(code)
        }
        fn attribute(&mut self, name: NameCode, value: &str) -> Result<(), Error> {
            self.0.attribute(name, value)
        }
        fn start_content(&mut self) -> Result<(), Error> {
            self.0.start_content()
        }
        fn end_element(&mut self) -> Result<(), Error> {
            self.0.end_element()
        }
        fn characters(&mut self, _value: &str) -> Result<(), Error> {
            Err(Error::receiver("text not accepted here"))
        }
        fn comment(&mut self, value: &str) -> Result<(), Error> {
            self.0.comment(value)
        }
        fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Error> {
            self.0.processing_instruction(target, data)
        }
    }

    let pool = pool();
    let root = doc()
        .child(elem("r").child(text("boom")).child(elem("never")))
        .build(&pool)
        .unwrap();
    let mut rec = FailOnText(Recorder::for_pool(&pool));
    let err = root.copy_to(&mut rec, WhichNamespaces::None).unwrap_err();
    assert_eq!(err.code, xdm_model::ErrorCode::ReceiverError);
    // The copy stopped at the failing text node.
    assert!(!rec.0.events.iter().any(|e| e.contains("never")));
}
