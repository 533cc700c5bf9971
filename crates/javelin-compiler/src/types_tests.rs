//! Tests for class indices, struct layout, and v-table resolution.

use javelin_classfile::{ClassFile, FieldInfo, MemoryClasspath};
use javelin_wasm::ValueType;

use super::functions::FunctionManager;
use super::loader::ClassFileLoader;
use super::test_utils::{RecordingWriter, concrete};
use super::types::{TypeManager, VTABLE_FIELD};

fn loader_with(classes: Vec<ClassFile>) -> ClassFileLoader {
    let mut classpath = MemoryClasspath::new();
    for class in classes {
        classpath.insert(class);
    }
    ClassFileLoader::new(Box::new(classpath))
}

#[test]
fn value_of_is_idempotent_and_indices_contiguous() {
    let mut types = TypeManager::new();
    assert_eq!(types.value_of("demo/A").class_index(), 0);
    assert_eq!(types.value_of("demo/B").class_index(), 1);
    assert_eq!(types.value_of("demo/A").class_index(), 0);
    assert_eq!(types.value_of("demo/C").class_index(), 2);
}

#[test]
fn finish_builds_inherited_field_layout() {
    let a = ClassFile::new("demo/A").with_field(FieldInfo::new("base", "J"));
    let b = ClassFile::new("demo/B")
        .with_super("demo/A")
        .with_field(FieldInfo::new("own", "Ljava/lang/String;"));

    let mut types = TypeManager::new();
    types.value_of("demo/B");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![a, b]);
    let mut writer = RecordingWriter::new();
    types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap();

    let fields = types.get("demo/B").unwrap().fields();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec![VTABLE_FIELD, "base", "own"]);
    assert_eq!(fields[0].ty, ValueType::I32);
    assert_eq!(fields[1].ty, ValueType::I64);
    assert_eq!(
        fields[2].ty,
        ValueType::Struct("java/lang/String".to_string())
    );
}

#[test]
fn override_reuses_the_superclass_slot() {
    let a = ClassFile::new("demo/A")
        .with_method(concrete("f", "()V"))
        .with_method(concrete("g", "()V"));
    let b = ClassFile::new("demo/B")
        .with_super("demo/A")
        .with_method(concrete("g", "()V"));

    let mut types = TypeManager::new();
    types.value_of("demo/A");
    types.value_of("demo/B");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![a, b]);
    let mut writer = RecordingWriter::new();
    types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap();

    let a_type = types.get("demo/A").unwrap();
    let b_type = types.get("demo/B").unwrap();
    assert_eq!(a_type.slot_of("g", "()V"), Some(1));
    assert_eq!(b_type.slot_of("g", "()V"), Some(1));
    assert_eq!(b_type.vtable()[1].signature_name(), "demo/B.g()V");
    assert_eq!(b_type.vtable()[0].signature_name(), "demo/A.f()V");
}

#[test]
fn finish_marks_chosen_overrides_as_needed() {
    let a = ClassFile::new("demo/A").with_method(concrete("f", "()V"));
    let b = ClassFile::new("demo/B")
        .with_super("demo/A")
        .with_method(concrete("f", "()V"));

    let mut types = TypeManager::new();
    types.value_of("demo/B");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![a, b]);
    let mut writer = RecordingWriter::new();
    types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap();

    let pending = functions.next_scan_later().unwrap();
    assert_eq!(pending.signature_name(), "demo/B.f()V");
    assert!(functions.need_this_parameter(&pending));
}

#[test]
fn finish_emits_vtable_data() {
    let a = ClassFile::new("demo/A").with_method(concrete("f", "()V"));

    let mut types = TypeManager::new();
    types.value_of("demo/A");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![a]);
    let mut writer = RecordingWriter::new();
    types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap();

    assert!(writer.contains("vtable demo/A #0 [demo/A.f()V]"));
}

#[test]
fn statics_constructors_and_privates_take_no_slot() {
    use javelin_classfile::{AccessFlags, MethodCode, MethodInfo};

    let a = ClassFile::new("demo/A")
        .with_method(
            MethodInfo::new("init", "()V")
                .with_access(AccessFlags(AccessFlags::STATIC))
                .with_code(MethodCode::default()),
        )
        .with_method(concrete("<init>", "()V"))
        .with_method(
            MethodInfo::new("secret", "()V")
                .with_access(AccessFlags(AccessFlags::PRIVATE))
                .with_code(MethodCode::default()),
        )
        .with_method(concrete("visible", "()V"));

    let mut types = TypeManager::new();
    types.value_of("demo/A");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![a]);
    let mut writer = RecordingWriter::new();
    types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap();

    let a_type = types.get("demo/A").unwrap();
    assert_eq!(a_type.vtable().len(), 1);
    assert_eq!(a_type.slot_of("visible", "()V"), Some(0));
    assert_eq!(a_type.slot_of("init", "()V"), None);
    assert_eq!(a_type.slot_of("secret", "()V"), None);
}

#[test]
fn finish_of_an_unknown_class_is_a_missing_class() {
    let mut types = TypeManager::new();
    types.value_of("demo/Ghost");
    let mut functions = FunctionManager::new();
    let mut loader = loader_with(vec![]);
    let mut writer = RecordingWriter::new();

    let err = types
        .prepare_finish(&mut writer, &mut functions, &mut loader)
        .unwrap_err();
    assert!(err.to_string().contains("demo/Ghost"));
}
