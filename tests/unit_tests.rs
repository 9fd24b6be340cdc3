//! Integration tests for callkit through the facade crate.
//!
//! These tests drive callables the way an embedding application would:
//! typed registration, text and document invocation, constructors on a shared
//! heap, and forwarding into a script session.

use callkit::prelude::*;
use callkit::{MismatchCounter, Ownership, TypeHash};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Load a fixture from the test_data directory.
#[cfg(feature = "xml")]
fn load_data(filename: &str) -> String {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn add_len(a: i32, b: String) -> i32 {
    a + b.len() as i32
}

// =============================================================================
// Text invocation
// =============================================================================

#[test]
fn test_text_call_all_fields() {
    let mut callable = DynamicCallable::from_fn(add_len);
    assert_eq!(callable.signature().text(), "int(int,string)");
    assert_eq!(callable.invoke_with_return("3|hello"), "8");
}

#[test]
fn test_text_call_missing_trailing_field() {
    let mut callable = DynamicCallable::from_fn(add_len);
    assert_eq!(callable.invoke_with_return("3"), "3");
}

#[test]
fn test_text_call_malformed_field_does_not_shift() {
    let mut callable = DynamicCallable::from_fn(|a: i32, b: i32, c: i32| a * 100 + b * 10 + c);
    assert_eq!(callable.invoke_with_return("1|x|3"), "103");
}

#[test]
fn test_constant_from_empty_text() {
    let mut callable = DynamicCallable::from_fn(|| 42_i64);
    assert_eq!(callable.parameter_count(), 0);
    assert_eq!(callable.invoke_with_return(""), "42");
}

#[test]
fn test_escaped_delimiter_in_string_field() {
    let mut callable = DynamicCallable::from_fn(|s: String| s.len() as u32);
    assert_eq!(callable.invoke_with_return(r"a\|b"), "3");
}

// =============================================================================
// Arities
// =============================================================================

#[test]
fn test_arity_one() {
    let mut callable = DynamicCallable::from_fn(|v: f64| v * 2.0);
    assert_eq!(callable.invoke_with_return("1.25"), "2.5");
}

#[test]
fn test_arity_three() {
    let mut callable = DynamicCallable::from_fn(|n: i32, scale: f64, loud: bool| {
        let value = f64::from(n) * scale;
        if loud { format!("{value}!") } else { value.to_string() }
    });
    assert_eq!(callable.signature().text(), "string(int,double,bool)");
    assert_eq!(callable.invoke_with_return("4|0.5|true"), "2!");
    assert_eq!(callable.invoke_with_return("4|0.5"), "2");
}

#[allow(clippy::too_many_arguments)]
fn sum16(
    a0: i32, a1: i32, a2: i32, a3: i32, a4: i32, a5: i32, a6: i32, a7: i32,
    a8: i32, a9: i32, a10: i32, a11: i32, a12: i32, a13: i32, a14: i32, a15: i32,
) -> i32 {
    a0 + a1 + a2 + a3 + a4 + a5 + a6 + a7 + a8 + a9 + a10 + a11 + a12 + a13 + a14 + a15
}

#[test]
fn test_arity_sixteen() {
    let mut callable = DynamicCallable::from_fn(sum16);
    assert_eq!(callable.parameter_count(), callkit::MAX_ARITY);
    assert_eq!(
        callable.invoke_with_return("1|2|3|4|5|6|7|8|9|10|11|12|13|14|15|16"),
        "136"
    );
    assert_eq!(callable.invoke_with_return("1|2"), "3");
    assert_eq!(callable.parameter_type_id(15), i32::type_hash());
    assert_eq!(callable.parameter_type_id(16), TypeHash::EMPTY);
}

// =============================================================================
// Packs and signature matching
// =============================================================================

#[test]
fn test_mismatched_pack_is_untouched() {
    let counter = Arc::new(MismatchCounter::new());
    let mut callable = DynamicCallable::from_fn(add_len).with_observer(counter.clone());

    let mut pack = ParameterPack::new::<i32, (i32, String, bool)>((3, "hello".into(), true));
    callable.invoke(&mut pack);

    assert_eq!(pack.return_value::<i32>(), Some(0));
    assert_eq!(pack.parameter::<String>(1).as_deref(), Some("hello"));
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_pack_reuse_across_calls() {
    let mut callable = DynamicCallable::from_fn(add_len);
    let mut pack = callable.make_pack().unwrap();

    assert!(pack.set_parameter(0, 10_i32));
    assert!(pack.set_parameter(1, String::from("abc")));
    callable.invoke(&mut pack);
    assert_eq!(pack.return_value::<i32>(), Some(13));

    assert!(pack.set_parameter(0, 1_i32));
    callable.invoke(&mut pack);
    assert_eq!(pack.return_value::<i32>(), Some(4));
}

#[test]
fn test_pack_copy_resets_return_but_assignment_keeps_it() {
    let mut callable = DynamicCallable::from_fn(add_len);
    let mut pack = ParameterPack::new::<i32, (i32, String)>((1, "a".into()));
    callable.invoke(&mut pack);
    assert_eq!(pack.return_value::<i32>(), Some(2));

    let copy = pack.clone();
    assert_eq!(copy.return_value::<i32>(), Some(0));

    let mut assigned = ParameterPack::defaults::<i32, (i32, String)>();
    assigned.clone_from(&pack);
    assert_eq!(assigned.return_value::<i32>(), Some(2));
}

// =============================================================================
// Ownership and cloning
// =============================================================================

struct Tally {
    total: i32,
}

impl TypedCallable<i32, (i32,)> for Tally {
    fn invoke(&mut self, (amount,): (i32,)) -> i32 {
        self.total += amount;
        self.total
    }

    fn clone_boxed(&self) -> Box<dyn TypedCallable<i32, (i32,)>> {
        Box::new(Tally { total: self.total })
    }
}

#[test]
fn test_clone_survives_original() {
    let original = DynamicCallable::owned(Tally { total: 100 });
    let mut copy = original.clone();
    drop(original);
    assert_eq!(copy.invoke_with_return("1"), "101");
}

#[test]
fn test_clone_matches_original_on_identical_packs() {
    let mut original = DynamicCallable::owned(Tally { total: 7 });
    let mut copy = original.clone();

    let prepared = original.make_pack_from_text("5").unwrap();
    let mut for_original = prepared.clone();
    let mut for_copy = prepared.clone();
    original.invoke(&mut for_original);
    copy.invoke(&mut for_copy);

    assert_eq!(for_original.return_value::<i32>(), Some(12));
    assert_eq!(
        for_original.return_value::<i32>(),
        for_copy.return_value::<i32>()
    );
    assert_eq!(prepared.return_value::<i32>(), Some(0));
}

#[test]
fn test_borrowed_callable_writes_through() {
    let mut tally = Tally { total: 0 };
    {
        let mut callable = DynamicCallable::borrowed(&mut tally);
        assert_eq!(callable.ownership(), Ownership::Borrowed);
        callable.invoke_text("4");
        callable.invoke_text("6");
    }
    assert_eq!(tally.total, 10);
}

#[test]
fn test_clone_per_thread() {
    let prototype = DynamicCallable::owned(Tally { total: 0 });
    let handles: Vec<_> = (1..=4)
        .map(|step| {
            let mut callable = prototype.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    callable.invoke_text(&step.to_string());
                }
                callable.invoke_with_return("0")
            })
        })
        .collect();

    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec!["10", "20", "30", "40"]);
}

#[test]
fn test_unbound_default() {
    let mut callable = DynamicCallable::default();
    assert!(!callable.is_bound());
    assert_eq!(callable.invoke_with_return("1|2|3"), "");
    let mut pack = ParameterPack::defaults::<(), ()>();
    callable.invoke(&mut pack);
}

// =============================================================================
// Enumerations and flags
// =============================================================================

mod typed_enums {
    use callkit::prelude::*;
    use num_enum::{IntoPrimitive, TryFromPrimitive};

    #[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
    #[repr(u8)]
    pub enum Team {
        Neutral = 0,
        Red = 1,
        Blue = 2,
    }

    impl Default for Team {
        fn default() -> Self {
            Team::Neutral
        }
    }

    callkit::enum_adapter!(Team: u8, "Team");

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct Perks: u16 {
            const SPEED = 1 << 0;
            const ARMOR = 1 << 1;
            const STEALTH = 1 << 2;
        }
    }

    callkit::flags_adapter!(Perks: u16, "Perks");

    #[test]
    fn test_enum_and_flags_parameters() {
        let mut callable = DynamicCallable::from_fn(|team: Team, perks: Perks| match team {
            Team::Neutral => Perks::empty(),
            _ => perks | Perks::ARMOR,
        });
        assert_eq!(callable.signature().text(), "Perks(Team,Perks)");
        assert_eq!(callable.invoke_with_return("1|5"), "7");
        assert_eq!(callable.invoke_with_return("0|5"), "0");
        // Unknown discriminant falls back to the default team
        assert_eq!(callable.invoke_with_return("9|1"), "0");
    }

    #[test]
    fn test_enum_return_through_pack() {
        let mut callable = DynamicCallable::from_fn(|red: bool| if red { Team::Red } else { Team::Blue });
        let mut pack = callable.make_pack_from_text("false").unwrap();
        callable.invoke(&mut pack);
        assert_eq!(pack.return_value::<Team>(), Some(Team::Blue));
    }
}

// =============================================================================
// Constructors
// =============================================================================

#[derive(Debug)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl NativeClass for Vec2 {
    const NAME: &'static str = "Vec2";
}

impl Constructible<(f32, f32)> for Vec2 {
    fn construct((x, y): (f32, f32)) -> Self {
        Vec2 { x, y }
    }
}

#[test]
fn test_constructor_yields_distinct_objects() {
    let heap = SharedHeap::new();
    let mut ctor = DynamicCallable::owned(ConstructingCallable::<Vec2, (f32, f32)>::new(heap.clone()));

    let mut first = ParameterPack::new::<Option<ObjectHandle>, (f32, f32)>((1.5, 2.5));
    let mut second = first.clone();
    ctor.invoke(&mut first);
    ctor.invoke(&mut second);

    let a = first.return_value::<Option<ObjectHandle>>().flatten().unwrap();
    let b = second.return_value::<Option<ObjectHandle>>().flatten().unwrap();
    assert_ne!(a, b);
    assert_eq!(heap.read(a, |v: &Vec2| (v.x, v.y)), Some((1.5, 2.5)));
    assert_eq!(heap.read(b, |v: &Vec2| (v.x, v.y)), Some((1.5, 2.5)));

    heap.write(a, |v: &mut Vec2| v.x = 9.0);
    assert_eq!(heap.read(b, |v: &Vec2| v.x), Some(1.5));
}

#[test]
fn test_constructed_handle_feeds_native_function() {
    let heap = SharedHeap::new();
    let mut ctor = DynamicCallable::owned(ConstructingCallable::<Vec2, (f32, f32)>::new(heap.clone()));
    let reader = heap.clone();
    let mut length = DynamicCallable::from_fn(move |handle: ObjectHandle| {
        reader
            .read(handle, |v: &Vec2| (v.x * v.x + v.y * v.y).sqrt())
            .unwrap_or_default()
    });

    let mut pack = ctor.make_pack_from_text("3|4").unwrap();
    ctor.invoke(&mut pack);
    let handle = pack.return_value::<Option<ObjectHandle>>().flatten().unwrap();

    let mut call = length.make_pack().unwrap();
    assert!(call.set_parameter(0, handle));
    length.invoke(&mut call);
    assert_eq!(call.return_value::<f32>(), Some(5.0));
}

// =============================================================================
// Script sessions
// =============================================================================

type ScriptFn = Box<dyn FnMut(&[Dynamic]) -> Dynamic + Send>;

/// Minimal script engine: functions by qualified name, one call at a time.
#[derive(Default)]
struct MiniEngine {
    functions: HashMap<String, ScriptFn>,
    current: Option<String>,
    arguments: Vec<Dynamic>,
    result: Option<Dynamic>,
}

impl MiniEngine {
    fn define(&mut self, name: &str, f: impl FnMut(&[Dynamic]) -> Dynamic + Send + 'static) {
        self.functions.insert(name.to_string(), Box::new(f));
    }
}

impl ScriptSession for MiniEngine {
    fn begin_call(
        &mut self,
        name: &str,
        _signature: &Signature,
        namespace: &[String],
    ) -> Result<(), callkit::ScriptError> {
        let qualified = QualifiedName::new(name, namespace.to_vec()).to_string();
        if !self.functions.contains_key(&qualified) {
            return Err(callkit::ScriptError::rejected(qualified));
        }
        self.current = Some(qualified);
        self.arguments.clear();
        self.result = None;
        Ok(())
    }

    fn push_argument(&mut self, value: Dynamic) -> Result<(), callkit::ScriptError> {
        self.arguments.push(value);
        Ok(())
    }

    fn end_call(&mut self) -> Result<(), callkit::ScriptError> {
        let name = self
            .current
            .take()
            .ok_or_else(|| callkit::ScriptError::failed("no call in progress"))?;
        let f = self
            .functions
            .get_mut(&name)
            .ok_or_else(|| callkit::ScriptError::failed("function vanished"))?;
        self.result = Some(f(&self.arguments));
        Ok(())
    }

    fn take_return(&mut self, _sample: &Dynamic) -> Option<Dynamic> {
        self.result.take()
    }
}

fn engine_with_damage() -> SessionRef {
    let mut engine = MiniEngine::default();
    engine.define("Combat::damage", |args| match args {
        [Dynamic::Int(base), Dynamic::Float(multiplier)] => {
            Dynamic::Int((*base as f64 * multiplier) as i64)
        }
        _ => Dynamic::Void,
    });
    Arc::new(Mutex::new(engine))
}

#[test]
fn test_script_call_through_dynamic_callable() {
    let session = engine_with_damage();
    let mut damage = DynamicCallable::owned(ScriptBoundCallable::<i32, (i32, f32)>::new(
        &session,
        "Combat::damage",
    ));
    assert_eq!(damage.invoke_with_return("10|1.5"), "15");
}

#[test]
fn test_script_call_unknown_function_defaults() {
    let session = engine_with_damage();
    let mut missing = ScriptBoundCallable::<i32, ()>::new(&session, "Combat::heal");
    assert_eq!(missing.invoke(()), 0);
}

#[test]
fn test_script_call_after_session_dropped() {
    let session = engine_with_damage();
    let mut damage = DynamicCallable::owned(ScriptBoundCallable::<i32, (i32, f32)>::new(
        &session,
        "Combat::damage",
    ));
    let copy = damage.clone();
    drop(session);
    assert_eq!(damage.invoke_with_return("10|1.5"), "0");
    assert_eq!(copy.clone().invoke_with_return("10|1.5"), "0");
}

// =============================================================================
// Registry and document-driven calls
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Spawn {
    count: i32,
    kind: String,
    delay: f32,
}

fn level_registry(spawns: Arc<Mutex<Vec<Spawn>>>, cues: Arc<Mutex<Vec<String>>>) -> CallableRegistry {
    let mut registry = CallableRegistry::new();
    registry
        .register(
            "Level::spawn_wave",
            DynamicCallable::from_fn(move |count: i32, kind: String, delay: f32| {
                spawns.lock().unwrap().push(Spawn { count, kind, delay });
                count.max(0) as u32
            }),
        )
        .unwrap();
    registry
        .register(
            "Audio::play",
            DynamicCallable::from_fn(move |cue: String, _looped: bool| {
                cues.lock().unwrap().push(cue);
            }),
        )
        .unwrap();
    registry
        .register("Level::checkpoint", DynamicCallable::from_fn(|| true))
        .unwrap();
    registry
}

#[test]
fn test_registry_text_dispatch() {
    let spawns = Arc::new(Mutex::new(Vec::new()));
    let cues = Arc::new(Mutex::new(Vec::new()));
    let mut registry = level_registry(spawns.clone(), cues.clone());

    let name = QualifiedName::from("Level::spawn_wave");
    assert_eq!(registry.invoke_text(&name, "5|bat|0.25").unwrap(), "5");
    assert_eq!(
        registry.invoke_text(&QualifiedName::from("Audio::play"), r"drum\|roll").unwrap(),
        ""
    );

    assert_eq!(
        spawns.lock().unwrap().as_slice(),
        &[Spawn {
            count: 5,
            kind: "bat".into(),
            delay: 0.25
        }]
    );
    assert_eq!(cues.lock().unwrap().as_slice(), &["drum|roll".to_string()]);
}

#[cfg(feature = "xml")]
#[test]
fn test_trigger_table_from_document() {
    let spawns = Arc::new(Mutex::new(Vec::new()));
    let cues = Arc::new(Mutex::new(Vec::new()));
    let mut registry = level_registry(spawns.clone(), cues.clone());

    let source = load_data("triggers.xml");
    let doc = callkit::roxmltree::Document::parse(&source).unwrap();

    let mut results = Vec::new();
    for call in doc.root_element().children().filter(|n| n.is_element()) {
        let name = QualifiedName::from(call.attribute("function").unwrap());
        let signature = registry.overloads(&name)[0].signature();
        let callable = registry.get_mut(&name, &signature).unwrap();
        results.push(callable.invoke_element_with_return(call));
    }

    assert_eq!(results, vec!["3", "2", "", "true", "0"]);
    assert_eq!(
        spawns.lock().unwrap().as_slice(),
        &[
            Spawn { count: 3, kind: "goblin".into(), delay: 1.5 },
            Spawn { count: 2, kind: "orc".into(), delay: 0.0 },
            Spawn { count: 0, kind: "troll".into(), delay: 0.5 },
        ]
    );
    assert_eq!(cues.lock().unwrap().as_slice(), &["horn|long".to_string()]);
}
