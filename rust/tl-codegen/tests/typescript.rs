//! End-to-end: schema text → generated TypeScript module.

use tl_codegen::targets::typescript;
use tl_schema::Tag;

fn compile(text: &str) -> tl_codegen::Compilation {
    let schema = tl_parse::parse_schema(text).unwrap();
    tl_codegen::compile(&schema).unwrap()
}

fn generate(text: &str) -> String {
    typescript::generate(&compile(text))
}

const FIXTURE: &str = "\
// LAYER 181

boolFalse#bc799737 = Bool;
boolTrue#997275b5 = Bool;
vector#1cb5c415 {t:Type} # [ t ] = Vector t;

peerUser#9db1bc6d user_id:long = Peer;
peerChat#36c6019a chat_id:long = Peer;
message#38116ee0 flags:# pinned:flags.2?true id:int reply:flags.1?Peer entities:flags.3?Vector<MessageEntity> = Message;
messageEmpty#83e5de54 flags:# id:flags.0?int = Message;
messageEntityBold#bd610bc9 offset:int length:int = MessageEntity;
pong#347773c5 msg_id:long ping_id:long = Pong;
config#330b4067 date:int test_mode:Bool = Config;
storage.fileJpeg#7efe0e = storage.FileType;

---functions---

ping#7abe77ec ping_id:long = Pong;
help.getConfig#c4f9186b = Config;
invokeAfterMsg#cb9f372d {X:Type} msg_id:long query:!X = X;
messages.sendMessage#fa88427a flags:# peer:Peer message:string = Message;
";

#[test]
fn single_constructor_module_end_to_end() {
    let module = generate("// LAYER 181\nmsg#abcdef01 text:string = Message;\n");
    let expected = r#"// @generated by tl-codegen
// DO NOT EDIT - regenerate with `tlc --schema <schema.tl> --out <module.ts>`

import type { Schema } from "./0_types.ts";

declare const R: unique symbol;

export type Function = { [R]?: unknown };

export type ReturnType<T> = T extends Function ? NonNullable<T[typeof R]> : never;

export interface msg {
  _: "msg";
  text: string;
}

export function msg(params: {
  text: string;
}): msg {
  return {
    _: "msg",
    text: params.text,
  };
}

export interface Types {
  "msg": msg;
}

export interface Functions<T = Function> {
}

export interface Enums {
  "Message": Message;
}

export type AnyType = Types[keyof Types];

export type AnyFunction<T = Function> = Functions<T>[keyof Functions<T>];

export type AnyObject<T = Function> = AnyType | AnyFunction<T>;

export type Message = msg;

export const schema = Object.freeze({
  definitions: {
    msg: [
      0xABCDEF01,
      [
        ["text", "string", "string"],
      ],
      "Message",
    ],
  },
  identifierToName: {
    [0xABCDEF01]: "msg",
  },
}) as unknown as Schema;

export function instanceValues(value: AnyObject<unknown>): Array<[string, string, unknown]> {
  const definitions = schema.definitions as unknown as Record<
    string,
    [number, Array<[string, string, string]>, string]
  >;
  const definition = definitions[value._];
  if (!definition) {
    throw new Error(`Cannot get values of unknown type: ${value._}`);
  }
  return definition[1].map(([name, type]): [string, string, unknown] => [
    name,
    type,
    (value as unknown as Record<string, unknown>)[name] ?? null,
  ]);
}
"#;
    assert_eq!(module, expected);
}

#[test]
fn round_trip_shape_properties() {
    let compilation = compile("msg#abcdef01 text:string = Message;");
    let shape = compilation.shape_by_name("msg").unwrap();
    assert_eq!(shape.name.flat(), "msg");
    assert_eq!(shape.tag, Tag(0xABCDEF01));
    assert_eq!(shape.tag.to_string(), "0xABCDEF01");
    assert_eq!(shape.fields.len(), 1);
    assert_eq!(shape.fields[0].name, "text");

    let group = compilation.groups.get("Message").unwrap();
    assert_eq!(group.members, vec!["msg"]);
    assert_eq!(compilation.shape_by_tag(Tag(0xABCDEF01)).unwrap(), shape);
}

#[test]
fn optional_fields_are_question_marked() {
    let module = generate(FIXTURE);
    assert!(module.contains("pinned?: true;"));
    assert!(module.contains("reply?: Peer;"));
    assert!(module.contains("entities?: Array<MessageEntity>;"));
    assert!(module.contains("id: number;"));
}

#[test]
fn all_optional_shapes_take_an_optional_aggregate() {
    let module = generate(FIXTURE);
    assert!(module.contains("export function messageEmpty(params?: {"));
    assert!(module.contains("id: params?.id,"));
    // A shape with any required field takes a required aggregate.
    assert!(module.contains("export function message(params: {"));
    assert!(module.contains("reply: params.reply,"));
}

#[test]
fn zero_field_shapes_take_an_optional_empty_aggregate() {
    let module = generate(FIXTURE);
    assert!(module.contains(
        "export function storage_fileJpeg(params?: Record<never, never>): storage_fileJpeg {"
    ));
    assert!(module.contains("return { _: \"storage.fileJpeg\" };"));
}

#[test]
fn generic_functions_are_parameterized() {
    let module = generate(FIXTURE);
    assert!(module.contains("export interface invokeAfterMsg<T> {"));
    assert!(module.contains("query: T;"));
    assert!(module.contains("[R]?: ReturnType<T>;"));
    assert!(module.contains("export type AnyGenericFunction<T> = invokeAfterMsg<T>;"));
    assert!(module.contains("\"invokeAfterMsg\": invokeAfterMsg<T>;"));
}

#[test]
fn singleton_result_groups_collapse_in_return_position() {
    let module = generate(FIXTURE);
    // Pong and Config each have exactly one constructor.
    assert!(module.contains("[R]?: pong;"));
    assert!(module.contains("[R]?: config;"));
    // Message has two; the return stays abstract.
    assert!(module.contains("[R]?: Message;"));
}

#[test]
fn group_aliases_are_unions_in_encounter_order() {
    let module = generate(FIXTURE);
    assert!(module.contains("export type Peer = peerUser | peerChat;"));
    assert!(module.contains("export type Message = message | messageEmpty;"));
    assert!(module.contains("export type storage_FileType = storage_fileJpeg;"));
}

#[test]
fn denylisted_constructors_never_surface() {
    let module = generate(FIXTURE);
    assert!(!module.contains("boolFalse"));
    assert!(!module.contains("boolTrue"));
    assert!(!module.contains("\"Bool\": Bool;"));
    assert!(!module.contains("0x1CB5C415"));
    // The boxed Bool type still renders as a plain boolean scalar.
    assert!(module.contains("test_mode: boolean;"));
}

#[test]
fn namespaces_are_mechanical_re_exports() {
    let module = generate(FIXTURE);
    assert!(module.contains(
        "export namespace storage {\n  export type fileJpeg = storage_fileJpeg;\n  export const fileJpeg = storage_fileJpeg;\n  export type FileType = storage_FileType;\n}"
    ));
    assert!(module.contains(
        "export namespace messages {\n  export type sendMessage = messages_sendMessage;\n  export const sendMessage = messages_sendMessage;\n}"
    ));
    assert!(module.contains("export interface messages_sendMessage {"));
    assert!(module.contains("_: \"messages.sendMessage\";"));
}

#[test]
fn descriptors_keep_bitmask_entries_and_raw_tokens() {
    let module = generate(FIXTURE);
    assert!(module.contains("[\"flags\", \"number\", \"#\"],"));
    assert!(module.contains("[\"reply\", \"Peer\", \"flags.1?Peer\"],"));
    assert!(module.contains("[\"entities\", \"Array<MessageEntity>\", \"flags.3?Vector<MessageEntity>\"],"));
}

#[test]
fn registry_covers_constructors_only_and_pads_tags() {
    let module = generate(FIXTURE);
    assert!(module.contains("[0x38116EE0]: \"message\","));
    assert!(module.contains("[0x007EFE0E]: \"storage.fileJpeg\","));
    // Functions carry tags in definitions but never enter identifierToName.
    assert!(module.contains("\"messages.sendMessage\": [\n      0xFA88427A,"));
    assert!(!module.contains("[0x7ABE77EC]:"));
}

#[test]
fn absent_optionals_become_an_explicit_null_sentinel() {
    let module = generate(FIXTURE);
    assert!(module.contains("(value as unknown as Record<string, unknown>)[name] ?? null,"));
}

#[test]
fn declared_and_instance_descriptors_share_ordering() {
    let compilation = compile(FIXTURE);
    let message = compilation.shape_by_name("message").unwrap();
    let names: Vec<_> = message.descriptor.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["flags", "pinned", "id", "reply", "entities"]);
    // Emitted fields are the descriptor minus the bitmask declaration.
    assert_eq!(message.fields.len(), message.descriptor.len() - 1);
}

#[test]
fn generation_is_byte_identical_across_runs() {
    assert_eq!(generate(FIXTURE), generate(FIXTURE));
}

#[test]
fn layer_marker_is_carried_and_absence_is_explicit() {
    let compilation = compile(FIXTURE);
    assert_eq!(compilation.layer, Some(181));

    let compilation = compile("msg#abcdef01 text:string = Message;");
    assert_eq!(compilation.layer, None);
}
