//! Schema fixtures shared by the generator tests.

use ironfbs_schema::{Schema, parse_schema};

use crate::language::GeneratedFile;

/// A monster schema exercising every construct the generators handle.
pub const MONSTER: &str = r#"{
    "file_name": "monster_test",
    "root_type": "MyGame.Example.Monster",
    "file_identifier": "MONS",
    "file_extension": "mon",
    "enums": [
        { "name": "Color", "namespace": "MyGame.Example", "underlying_type": "ubyte",
          "attributes": { "bit_flags": "" },
          "doc": ["Composite components of Monster color."],
          "values": [ { "name": "Red" }, { "name": "Green" }, { "name": "Blue", "value": 3 } ] },
        { "name": "Race", "namespace": "MyGame.Example", "underlying_type": "byte",
          "values": [ { "name": "None", "value": -1 }, { "name": "Human" }, { "name": "Dwarf" }, { "name": "Elf" } ] },
        { "name": "Any", "namespace": "MyGame.Example", "is_union": true,
          "values": [ { "name": "Monster" }, { "name": "Weapon", "type": "MyGame.Example2.Weapon" },
                      { "name": "Label", "type": "string" } ] },
        { "name": "OldEnum", "namespace": "MyGame", "generated": true, "values": [ { "name": "Gone" } ] }
    ],
    "structs": [
        { "name": "Test", "namespace": "MyGame.Example", "fixed": true,
          "fields": [ { "name": "a", "type": "short" }, { "name": "b", "type": "byte" } ] },
        { "name": "Vec3", "namespace": "MyGame.Example", "fixed": true,
          "fields": [
            { "name": "x", "type": "float" }, { "name": "y", "type": "float" }, { "name": "z", "type": "float" },
            { "name": "test1", "type": "double" }, { "name": "test2", "type": "Color" },
            { "name": "test3", "type": "Test" } ] },
        { "name": "Grid", "namespace": "MyGame.Example", "fixed": true,
          "fields": [
            { "name": "cells", "type": "[short:3]" }, { "name": "corners", "type": "[Test:2]" },
            { "name": "scale", "type": "float" } ] },
        { "name": "Weapon", "namespace": "MyGame.Example2",
          "fields": [
            { "name": "damage", "type": "short", "default": 5 },
            { "name": "class", "type": "string" },
            { "name": "range", "type": "int" },
            { "name": "end", "type": "bool", "default": true } ] },
        { "name": "Stat", "namespace": "MyGame.Example",
          "fields": [ { "name": "id", "type": "string" }, { "name": "count", "type": "ushort", "key": true } ] },
        { "name": "Monster", "namespace": "MyGame.Example",
          "doc": ["an example documentation comment: monster object"],
          "fields": [
            { "name": "pos", "type": "Vec3" },
            { "name": "mana", "type": "short", "default": 150 },
            { "name": "hp", "type": "short", "default": 100 },
            { "name": "name", "type": "string", "required": true, "key": true },
            { "name": "friendly", "type": "bool", "default": false, "deprecated": true },
            { "name": "inventory", "type": "[ubyte]" },
            { "name": "color", "type": "Color", "default": "Blue" },
            { "name": "race", "type": "Race", "default": "None" },
            { "name": "test", "type": "Any" },
            { "name": "test4", "type": "[Test]" },
            { "name": "testarrayofstring", "type": "[string]", "doc": ["an array of names"] },
            { "name": "testarrayoftables", "type": "[Monster]" },
            { "name": "enemy", "type": "Monster" },
            { "name": "testnestedflatbuffer", "type": "[ubyte]", "nested_flatbuffer": "Monster" },
            { "name": "stats", "type": "[Stat]" },
            { "name": "weapons", "type": "[Any]" },
            { "name": "testf", "type": "float", "default": 3.5 },
            { "name": "big", "type": "ulong" } ] },
        { "name": "Legacy", "namespace": "MyGame", "generated": true,
          "fields": [ { "name": "x", "type": "int" } ] },
        { "name": "InParentNamespace", "namespace": "MyGame", "fields": [] }
    ]
}"#;

/// Names of the definitions every generator must emit exactly once.
pub const EMITTED: [&str; 10] = [
    "Color",
    "Race",
    "Any",
    "Test",
    "Vec3",
    "Grid",
    "Weapon",
    "Stat",
    "Monster",
    "InParentNamespace",
];

/// Parses [`MONSTER`].
pub fn monster() -> Schema {
    parse_schema(MONSTER).expect("Failed to parse monster fixture")
}

/// Returns the contents of the file whose path ends with `suffix`.
pub fn file<'a>(files: &'a [GeneratedFile], suffix: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.to_string_lossy().replace('\\', "/").ends_with(suffix))
        .map(|f| f.contents.as_str())
        .unwrap_or_else(|| panic!("no generated file ending in {suffix}"))
}

/// Concatenates all generated files.
pub fn all(files: &[GeneratedFile]) -> String {
    files.iter().map(|f| f.contents.as_str()).collect()
}

/// Counts lines that start (after indentation) with `prefix`.
pub fn count_lines(text: &str, prefix: &str) -> usize {
    text.lines().filter(|l| l.trim_start().starts_with(prefix)).count()
}

/// Leading whitespace width of a line, tabs and spaces counted alike.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Lines of the block opened by the first line containing `header`: the
/// header itself and every following line indented deeper, up to the first
/// blank line or the first line back at the header's level.
pub fn block<'a>(text: &'a str, header: &str) -> Vec<&'a str> {
    let mut lines = text.lines().skip_while(|l| !l.contains(header));
    let Some(first) = lines.next() else {
        panic!("no line contains {header}");
    };
    let level = indent_of(first);
    let mut block = vec![first];
    block.extend(lines.take_while(|l| !l.trim().is_empty() && indent_of(l) > level));
    block
}

/// Index of the first line in `block` containing `needle`.
pub fn position(block: &[&str], needle: &str) -> usize {
    block
        .iter()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("{needle} not found in:\n{}", block.join("\n")))
}
