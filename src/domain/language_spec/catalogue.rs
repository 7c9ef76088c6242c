use crate::domain::models::Language;

/// How a language expresses declared base classes/interfaces.
/// Matched against by the connector-layer extractor; the catalogue only
/// records *which* strategy applies, keeping language_spec free of a
/// tree-sitter dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseClassStrategy {
    /// Python: a `superclasses` field holding an argument-list-like node.
    PythonSuperclasses,
    /// Java: `superclass` + `interfaces` fields, recursing to a `type_identifier`.
    JavaSuperclassInterfaces,
    /// TS/JS: a `class_heritage` block with `extends_clause`/`implements_clause`,
    /// falling back to bare identifier siblings for plain JS classes.
    TsClassHeritage,
    /// C++: `base_class_clause`.
    CppBaseClassClause,
    /// Kotlin: `delegation_specifier_list`, stripping constructor-call parens.
    KotlinDelegationSpecifiers,
    /// Ruby: a constant node inside `superclass`.
    RubySuperclassConstant,
    /// Swift: `inheritance_specifier`, walking to `type_identifier`.
    SwiftInheritanceSpecifier,
    /// Scala: `extends_clause`.
    ScalaExtendsClause,
    /// PHP: `base_clause`, falling back to a by-kind search when no field exists.
    PhpBaseClause,
    /// C#: `bases`/`base_list`, same field-then-kind fallback as PHP.
    CSharpBaseList,
    /// Go has no declared inheritance; structural satisfaction is computed
    /// separately in the IMPLEMENTS pass.
    None,
}

/// How a language marks up decorators/annotations on a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorStrategy {
    /// Python `decorator` children of the definition node.
    PythonDecoratorChildren,
    /// Java/Kotlin: `modifiers` child containing `annotation` nodes.
    ModifiersAnnotation,
    /// C# `attribute_list` children.
    CSharpAttributeList,
    /// TS/TSX: decorators are *preceding siblings* within the enclosing
    /// `class_body`, not children of the method/field itself.
    PrecedingSiblingDecorator,
    /// Rust `#[attr]` attributes: preceding siblings at item level, stopping
    /// at the first non-`attribute_item` sibling.
    RustPrecedingAttributeItems,
    /// PHP `attribute_list` -> `attribute_group` -> `attribute`.
    PhpAttributeGroups,
    /// Swift `attribute` children.
    SwiftAttributeChildren,
    /// Groovy-style direct `annotation` children (also covers Scala-lite annotation use).
    DirectAnnotationChildren,
    /// Dart: annotations are preceding siblings, same shape as TS.
    PrecedingSiblingAnnotation,
    None,
}

/// How doc comments are attached to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCommentStyle {
    /// Python: first statement of `body` is a bare string expression.
    PythonDocstring,
    /// Line-comment block ending immediately above the node, using the given prefix.
    LinePrefix(&'static str),
    /// Block comment `/**... */` or `/*... */` immediately above the node.
    BlockComment,
}

/// A declarative record of one language's AST shape. Node kind
/// strings are whatever the language's tree-sitter grammar emits.
pub struct LanguageSpec {
    pub language: Language,
    pub function_node_types: &'static [&'static str],
    pub method_node_types: &'static [&'static str],
    pub class_node_types: &'static [&'static str],
    pub interface_node_types: &'static [&'static str],
    pub enum_node_types: &'static [&'static str],
    pub variable_node_types: &'static [&'static str],
    pub call_node_types: &'static [&'static str],
    pub import_node_types: &'static [&'static str],
    pub import_from_types: &'static [&'static str],
    pub branching_node_types: &'static [&'static str],
    pub throw_node_types: &'static [&'static str],
    pub throws_clause_field: Option<&'static str>,
    pub env_access_functions: &'static [&'static str],
    pub env_access_member_patterns: &'static [&'static str],
    pub builtin_types: &'static [&'static str],
    pub doc_comment_style: DocCommentStyle,
    pub base_class_strategy: BaseClassStrategy,
    pub decorator_strategy: DecoratorStrategy,
    /// Field names tried in order to find a function/method's parameter list
    /// (`parameters`, `formal_parameters`, `value_parameters`,...), plus any
    /// nested-field fallbacks (C/C++ nest under `declarator.parameters`).
    pub param_list_fields: &'static [&'static str],
    /// Field names tried, in order, to find the return type.
    pub return_type_fields: &'static [&'static str],
    /// Name-prefix heuristics for `is_test` beyond the generic "contains test".
    pub test_name_prefixes: &'static [&'static str],
    /// Decorator/annotation text fragments that mark an entry point (route handlers).
    pub entry_point_markers: &'static [&'static str],
}

macro_rules! spec {
    ($name:ident, $lang:expr, $($field:ident: $value:expr),* $(,)?) => {
        pub static $name: LanguageSpec = LanguageSpec {
            language: $lang,
            $($field: $value,)*
        };
    };
}

spec!(RUST, Language::Rust,
    function_node_types: &["function_item"],
    method_node_types: &["function_item"],
    class_node_types: &["struct_item"],
    interface_node_types: &["trait_item"],
    enum_node_types: &["enum_item"],
    variable_node_types: &["const_item", "static_item", "let_declaration"],
    call_node_types: &["call_expression", "macro_invocation"],
    import_node_types: &["use_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_expression", "if_let_expression", "for_expression", "while_expression", "while_let_expression", "match_expression", "match_arm", "&&", "||"],
    throw_node_types: &["macro_invocation"],
    throws_clause_field: None,
    env_access_functions: &["std::env::var", "env::var"],
    env_access_member_patterns: &[],
    builtin_types: &["i8","i16","i32","i64","i128","isize","u8","u16","u32","u64","u128","usize","f32","f64","bool","char","str","String","Vec","Option","Result","()"],
    doc_comment_style: DocCommentStyle::LinePrefix("///"),
    base_class_strategy: BaseClassStrategy::None,
    decorator_strategy: DecoratorStrategy::RustPrecedingAttributeItems,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &[],
    entry_point_markers: &["get(", "post(", "put(", "delete("],
);

spec!(PYTHON, Language::Python,
    function_node_types: &["function_definition"],
    method_node_types: &["function_definition"],
    class_node_types: &["class_definition"],
    interface_node_types: &[],
    enum_node_types: &[],
    variable_node_types: &["assignment"],
    call_node_types: &["call"],
    import_node_types: &["import_statement"],
    import_from_types: &["import_from_statement"],
    branching_node_types: &["if_statement", "elif_clause", "for_statement", "while_statement", "except_clause", "boolean_operator", "conditional_expression"],
    throw_node_types: &["raise_statement"],
    throws_clause_field: None,
    env_access_functions: &["os.getenv", "os.environ.get"],
    env_access_member_patterns: &["os.environ"],
    builtin_types: &["int","str","float","bool","bytes","list","dict","set","tuple","None","Any","object"],
    doc_comment_style: DocCommentStyle::PythonDocstring,
    base_class_strategy: BaseClassStrategy::PythonSuperclasses,
    decorator_strategy: DecoratorStrategy::PythonDecoratorChildren,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &["test_"],
    entry_point_markers: &["@app.", "@get", "@post", "@route"],
);

spec!(JAVASCRIPT, Language::JavaScript,
    function_node_types: &["function_declaration", "arrow_function", "function_expression"],
    method_node_types: &["method_definition"],
    class_node_types: &["class_declaration"],
    interface_node_types: &[],
    enum_node_types: &[],
    variable_node_types: &["lexical_declaration", "variable_declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["import_statement"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "for_in_statement", "while_statement", "switch_case", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement"],
    throws_clause_field: None,
    env_access_functions: &[],
    env_access_member_patterns: &["process.env"],
    builtin_types: &["any","void","undefined","null","number","string","boolean","object","Function"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::TsClassHeritage,
    decorator_strategy: DecoratorStrategy::PrecedingSiblingDecorator,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &[],
    entry_point_markers: &["@get", "@post", ".get(", ".post(", "router."],
);

spec!(TYPESCRIPT, Language::TypeScript,
    function_node_types: &["function_declaration", "arrow_function", "function_expression"],
    method_node_types: &["method_definition"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["interface_declaration"],
    enum_node_types: &["enum_declaration"],
    variable_node_types: &["lexical_declaration", "variable_declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["import_statement"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "for_in_statement", "while_statement", "switch_case", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement"],
    throws_clause_field: None,
    env_access_functions: &[],
    env_access_member_patterns: &["process.env"],
    builtin_types: &["any","void","undefined","null","number","string","boolean","object","unknown","never"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::TsClassHeritage,
    decorator_strategy: DecoratorStrategy::PrecedingSiblingDecorator,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &[],
    entry_point_markers: &["@Get", "@Post", "@Controller", "@route"],
);

spec!(GO, Language::Go,
    function_node_types: &["function_declaration"],
    // `method_elem`/`method_spec` are an interface body's method
    // signatures (no receiver, no body) - extracted as Method nodes under
    // the interface so §4.7.7's structural-satisfaction pass has a
    // DEFINES_METHOD-derived method set to compare against.
    method_node_types: &["method_declaration", "method_elem", "method_spec"],
    class_node_types: &["type_declaration"],
    interface_node_types: &["type_declaration"],
    enum_node_types: &[],
    variable_node_types: &["const_declaration", "var_declaration", "short_var_declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["import_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "expression_switch_statement", "type_switch_statement", "communication_clause", "&&", "||"],
    throw_node_types: &["panic"],
    throws_clause_field: None,
    env_access_functions: &["os.Getenv", "os.LookupEnv"],
    env_access_member_patterns: &[],
    builtin_types: &["int","int8","int16","int32","int64","uint","uint8","uint16","uint32","uint64","float32","float64","bool","string","byte","rune","error","any","interface{}"],
    doc_comment_style: DocCommentStyle::LinePrefix("//"),
    base_class_strategy: BaseClassStrategy::None,
    decorator_strategy: DecoratorStrategy::None,
    param_list_fields: &["parameters"],
    return_type_fields: &["result"],
    test_name_prefixes: &["Test"],
    entry_point_markers: &[],
);

spec!(JAVA, Language::Java,
    function_node_types: &["method_declaration"],
    method_node_types: &["method_declaration"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["interface_declaration"],
    enum_node_types: &["enum_declaration"],
    variable_node_types: &["field_declaration", "local_variable_declaration"],
    call_node_types: &["method_invocation", "object_creation_expression"],
    import_node_types: &["import_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "enhanced_for_statement", "while_statement", "switch_label", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement"],
    throws_clause_field: Some("throws"),
    env_access_functions: &["System.getenv"],
    env_access_member_patterns: &[],
    builtin_types: &["int","long","short","byte","float","double","boolean","char","void","String","Object","Integer","Long"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::JavaSuperclassInterfaces,
    decorator_strategy: DecoratorStrategy::ModifiersAnnotation,
    param_list_fields: &["parameters"],
    return_type_fields: &["type"],
    test_name_prefixes: &[],
    entry_point_markers: &["@Test", "@RequestMapping", "@GetMapping", "@PostMapping"],
);

spec!(PHP, Language::Php,
    function_node_types: &["function_definition"],
    method_node_types: &["method_declaration"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["interface_declaration"],
    enum_node_types: &["enum_declaration"],
    variable_node_types: &["expression_statement"],
    call_node_types: &["function_call_expression", "member_call_expression", "object_creation_expression"],
    import_node_types: &["namespace_use_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "foreach_statement", "while_statement", "switch_statement", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_expression"],
    throws_clause_field: None,
    env_access_functions: &["getenv"],
    env_access_member_patterns: &["$_ENV", "$_SERVER"],
    builtin_types: &["int","float","string","bool","array","object","mixed","void","null","self","static"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::PhpBaseClause,
    decorator_strategy: DecoratorStrategy::PhpAttributeGroups,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &["test"],
    entry_point_markers: &["#[Route", "#[Get", "#[Post"],
);

spec!(CPP, Language::Cpp,
    function_node_types: &["function_definition"],
    method_node_types: &["function_definition"],
    class_node_types: &["class_specifier", "struct_specifier"],
    interface_node_types: &[],
    enum_node_types: &["enum_specifier"],
    variable_node_types: &["declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["preproc_include"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "while_statement", "switch_statement", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement"],
    throws_clause_field: None,
    env_access_functions: &["getenv", "std::getenv"],
    env_access_member_patterns: &[],
    builtin_types: &["int","long","short","char","float","double","bool","void","size_t","auto","std::string"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::CppBaseClassClause,
    decorator_strategy: DecoratorStrategy::None,
    param_list_fields: &["declarator.parameters"],
    return_type_fields: &["type"],
    test_name_prefixes: &[],
    entry_point_markers: &[],
);

spec!(SWIFT, Language::Swift,
    function_node_types: &["function_declaration"],
    method_node_types: &["function_declaration"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["protocol_declaration"],
    enum_node_types: &["enum_declaration" ],
    variable_node_types: &["property_declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["import_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "while_statement", "switch_statement", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement"],
    throws_clause_field: Some("throws"),
    env_access_functions: &["ProcessInfo.processInfo.environment"],
    env_access_member_patterns: &["ProcessInfo.processInfo.environment"],
    builtin_types: &["Int","Double","Float","Bool","String","Character","Any","Void","AnyObject"],
    doc_comment_style: DocCommentStyle::LinePrefix("///"),
    base_class_strategy: BaseClassStrategy::SwiftInheritanceSpecifier,
    decorator_strategy: DecoratorStrategy::SwiftAttributeChildren,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &["test"],
    entry_point_markers: &["@main"],
);

spec!(KOTLIN, Language::Kotlin,
    function_node_types: &["function_declaration"],
    method_node_types: &["function_declaration"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["class_declaration"],
    enum_node_types: &["class_declaration"],
    variable_node_types: &["property_declaration"],
    call_node_types: &["call_expression"],
    import_node_types: &["import_header"],
    import_from_types: &[],
    branching_node_types: &["if_expression", "for_statement", "while_statement", "when_entry", "catch_block", "&&", "||"],
    throw_node_types: &["throw_expression"],
    throws_clause_field: None,
    env_access_functions: &["System.getenv"],
    env_access_member_patterns: &[],
    builtin_types: &["Int","Long","Short","Byte","Float","Double","Boolean","Char","String","Unit","Any"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::KotlinDelegationSpecifiers,
    decorator_strategy: DecoratorStrategy::ModifiersAnnotation,
    param_list_fields: &["parameters"],
    return_type_fields: &["type"],
    test_name_prefixes: &[],
    entry_point_markers: &["@Test", "@GetMapping", "@PostMapping"],
);

spec!(CSHARP, Language::CSharp,
    function_node_types: &["method_declaration"],
    method_node_types: &["method_declaration"],
    class_node_types: &["class_declaration"],
    interface_node_types: &["interface_declaration"],
    enum_node_types: &["enum_declaration"],
    variable_node_types: &["field_declaration", "local_declaration_statement"],
    call_node_types: &["invocation_expression", "object_creation_expression"],
    import_node_types: &["using_directive"],
    import_from_types: &[],
    branching_node_types: &["if_statement", "for_statement", "foreach_statement", "while_statement", "switch_section", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_statement", "throw_expression"],
    throws_clause_field: None,
    env_access_functions: &["Environment.GetEnvironmentVariable"],
    env_access_member_patterns: &[],
    builtin_types: &["int","long","short","byte","float","double","decimal","bool","char","string","object","void","var"],
    doc_comment_style: DocCommentStyle::LinePrefix("///"),
    base_class_strategy: BaseClassStrategy::CSharpBaseList,
    decorator_strategy: DecoratorStrategy::CSharpAttributeList,
    param_list_fields: &["parameters"],
    return_type_fields: &["type"],
    test_name_prefixes: &[],
    entry_point_markers: &["[HttpGet", "[HttpPost", "[Test]"],
);

spec!(RUBY, Language::Ruby,
    function_node_types: &["method"],
    method_node_types: &["method"],
    class_node_types: &["class"],
    interface_node_types: &["module"],
    enum_node_types: &[],
    variable_node_types: &["assignment"],
    call_node_types: &["call", "method_call"],
    import_node_types: &["call"],
    import_from_types: &[],
    branching_node_types: &["if", "elsif", "unless", "for", "while", "case", "rescue", "&&", "||"],
    throw_node_types: &["call"],
    throws_clause_field: None,
    env_access_functions: &[],
    env_access_member_patterns: &["ENV"],
    builtin_types: &["Integer","Float","String","Symbol","Array","Hash","NilClass","TrueClass","FalseClass"],
    doc_comment_style: DocCommentStyle::LinePrefix("#"),
    base_class_strategy: BaseClassStrategy::RubySuperclassConstant,
    decorator_strategy: DecoratorStrategy::None,
    param_list_fields: &["parameters"],
    return_type_fields: &[],
    test_name_prefixes: &["test_"],
    entry_point_markers: &["get ", "post ", "Sinatra"],
);

spec!(SCALA, Language::Scala,
    function_node_types: &["function_definition"],
    method_node_types: &["function_definition"],
    class_node_types: &["class_definition"],
    interface_node_types: &["trait_definition"],
    enum_node_types: &["enum_definition"],
    variable_node_types: &["val_definition", "var_definition"],
    call_node_types: &["call_expression", "instance_expression"],
    import_node_types: &["import_declaration"],
    import_from_types: &[],
    branching_node_types: &["if_expression", "for_expression", "while_expression", "match_expression", "case_clause", "catch_clause", "&&", "||"],
    throw_node_types: &["throw_expression"],
    throws_clause_field: None,
    env_access_functions: &["sys.env.get", "System.getenv"],
    env_access_member_patterns: &["sys.env"],
    builtin_types: &["Int","Long","Short","Byte","Float","Double","Boolean","Char","String","Unit","Any"],
    doc_comment_style: DocCommentStyle::BlockComment,
    base_class_strategy: BaseClassStrategy::ScalaExtendsClause,
    decorator_strategy: DecoratorStrategy::DirectAnnotationChildren,
    param_list_fields: &["parameters"],
    return_type_fields: &["return_type"],
    test_name_prefixes: &[],
    entry_point_markers: &["@main"],
);

/// Returns the catalogue entry for `language`, or `None` for custom-extracted
/// or unknown languages.
pub fn language_spec(language: Language) -> Option<&'static LanguageSpec> {
    match language {
        Language::Rust => Some(&RUST),
        Language::Python => Some(&PYTHON),
        Language::JavaScript => Some(&JAVASCRIPT),
        Language::TypeScript => Some(&TYPESCRIPT),
        Language::Go => Some(&GO),
        Language::Java => Some(&JAVA),
        Language::Php => Some(&PHP),
        Language::Cpp => Some(&CPP),
        Language::Swift => Some(&SWIFT),
        Language::Kotlin => Some(&KOTLIN),
        Language::CSharp => Some(&CSHARP),
        Language::Ruby => Some(&RUBY),
        Language::Scala => Some(&SCALA),
        Language::Lua | Language::Elixir | Language::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalogue_language_resolves() {
        for lang in [
            Language::Rust, Language::Python, Language::JavaScript, Language::TypeScript,
            Language::Go, Language::Java, Language::Php, Language::Cpp, Language::Swift,
            Language::Kotlin, Language::CSharp, Language::Ruby, Language::Scala,
        ] {
            assert!(language_spec(lang).is_some(), "{lang:?} missing from catalogue");
        }
    }

    #[test]
    fn custom_extracted_languages_have_no_catalogue_entry() {
        assert!(language_spec(Language::Lua).is_none());
        assert!(language_spec(Language::Elixir).is_none());
    }
}
