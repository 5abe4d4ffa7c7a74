//! Token catalog: the closed set of lexical kinds and their static attributes
//!
//! Every raw kind produced by a PHP/Hack lexer (symbolic `T_*` names and
//! single-character literal tokens) maps to exactly one [`TokenKind`]. The
//! per-kind data (category, short name, statement and scope behaviour) is
//! fixed at compile time and read through plain `match` tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// CATEGORIES
// ============================================================================

/// Presentation category of a token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Comment,
    Constant,
    Default,
    Keyword,
    Operator,
    String,
    Variable,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Comment => "comment",
            TokenCategory::Constant => "constant",
            TokenCategory::Default => "default",
            TokenCategory::Keyword => "keyword",
            TokenCategory::Operator => "operator",
            TokenCategory::String => "string",
            TokenCategory::Variable => "variable",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delimiter family used when matching an opening token to its closer.
///
/// Openers only balance against closers of the same class, so a stray `)`
/// never closes a `{`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelimiterClass {
    /// `{`, `{$` and `${` closed by `}`
    Brace,
    /// `(` and lambda parameter parens
    Paren,
    /// `[` and `]`
    Square,
    /// Hack generic type lists
    TypeList,
}

// ============================================================================
// KIND TABLE
// ============================================================================

macro_rules! token_kinds {
    ($($variant:ident => $raw:literal, $short:literal, $category:ident;)+) => {
        /// Closed enumeration of every lexical kind the analyser understands
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum TokenKind {
            $($variant,)+
        }

        impl TokenKind {
            /// Every kind in catalog order
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)+];

            /// Canonical raw lexer name (`T_FUNCTION`) or literal character (`{`)
            pub fn raw_name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $raw,)+
                }
            }

            /// Short human-readable name (`Function`, `Open_Curly`)
            pub fn short_name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $short,)+
                }
            }

            pub fn category(self) -> TokenCategory {
                match self {
                    $(TokenKind::$variant => TokenCategory::$category,)+
                }
            }
        }
    };
}

token_kinds! {
    Abstract => "T_ABSTRACT", "Abstract", Keyword;
    Ampersand => "&", "Ampersand", Operator;
    AndEqual => "T_AND_EQUAL", "And_Equal", Operator;
    Array => "T_ARRAY", "Array", Keyword;
    ArrayCast => "T_ARRAY_CAST", "Array_Cast", Operator;
    As => "T_AS", "As", Keyword;
    Async => "T_ASYNC", "Async", Keyword;
    At => "@", "At", Operator;
    Await => "T_AWAIT", "Await", Keyword;
    Backtick => "`", "Backtick", String;
    BadCharacter => "T_BAD_CHARACTER", "Bad_Character", Default;
    BoolCast => "T_BOOL_CAST", "Bool_Cast", Operator;
    BooleanAnd => "T_BOOLEAN_AND", "Boolean_And", Operator;
    BooleanOr => "T_BOOLEAN_OR", "Boolean_Or", Operator;
    Break => "T_BREAK", "Break", Keyword;
    Callable => "T_CALLABLE", "Callable", Keyword;
    Caret => "^", "Caret", Operator;
    Case => "T_CASE", "Case", Keyword;
    Catch => "T_CATCH", "Catch", Keyword;
    Character => "T_CHARACTER", "Character", Default;
    Class => "T_CLASS", "Class", Keyword;
    ClassC => "T_CLASS_C", "Class_C", Constant;
    ClassNameConstant => "T_CLASS_NAME_CONSTANT", "Class_Name_Constant", Constant;
    Clone => "T_CLONE", "Clone", Keyword;
    CloseBracket => ")", "Close_Bracket", Default;
    CloseCurly => "}", "Close_Curly", Default;
    CloseSquare => "]", "Close_Square", Default;
    CloseTag => "T_CLOSE_TAG", "Close_Tag", Default;
    Coalesce => "T_COALESCE", "Coalesce", Operator;
    Colon => ":", "Colon", Operator;
    Comma => ",", "Comma", Default;
    Comment => "T_COMMENT", "Comment", Comment;
    CompilerHaltOffset => "T_COMPILER_HALT_OFFSET", "Compiler_Halt_Offset", Constant;
    ConcatEqual => "T_CONCAT_EQUAL", "Concat_Equal", Operator;
    Const => "T_CONST", "Const", Keyword;
    ConstantEncapsedString => "T_CONSTANT_ENCAPSED_STRING", "Constant_Encapsed_String", String;
    Continue => "T_CONTINUE", "Continue", Keyword;
    CurlyOpen => "T_CURLY_OPEN", "Curly_Open", Default;
    Dec => "T_DEC", "Dec", Operator;
    Declare => "T_DECLARE", "Declare", Keyword;
    Default => "T_DEFAULT", "Default", Keyword;
    Dir => "T_DIR", "Dir", Constant;
    Div => "/", "Div", Operator;
    DivEqual => "T_DIV_EQUAL", "Div_Equal", Operator;
    Dnumber => "T_DNUMBER", "Dnumber", Constant;
    Do => "T_DO", "Do", Keyword;
    DocComment => "T_DOC_COMMENT", "Doc_Comment", Comment;
    Dollar => "$", "Dollar", Variable;
    DollarOpenCurlyBraces => "T_DOLLAR_OPEN_CURLY_BRACES", "Dollar_Open_Curly_Braces", Default;
    Dot => ".", "Dot", Operator;
    DoubleArrow => "T_DOUBLE_ARROW", "Double_Arrow", Operator;
    DoubleCast => "T_DOUBLE_CAST", "Double_Cast", Operator;
    DoubleColon => "T_PAAMAYIM_NEKUDOTAYIM", "Double_Colon", Operator;
    DoubleQuotes => "\"", "Double_Quotes", String;
    Echo => "T_ECHO", "Echo", Keyword;
    Ellipsis => "T_ELLIPSIS", "Ellipsis", Operator;
    Else => "T_ELSE", "Else", Keyword;
    Elseif => "T_ELSEIF", "Elseif", Keyword;
    Empty => "T_EMPTY", "Empty", Keyword;
    EncapsedAndWhitespace => "T_ENCAPSED_AND_WHITESPACE", "Encapsed_And_Whitespace", String;
    Enddeclare => "T_ENDDECLARE", "Enddeclare", Keyword;
    Endfor => "T_ENDFOR", "Endfor", Keyword;
    Endforeach => "T_ENDFOREACH", "Endforeach", Keyword;
    Endif => "T_ENDIF", "Endif", Keyword;
    Endswitch => "T_ENDSWITCH", "Endswitch", Keyword;
    Endwhile => "T_ENDWHILE", "Endwhile", Keyword;
    EndHeredoc => "T_END_HEREDOC", "End_Heredoc", String;
    Enum => "T_ENUM", "Enum", Keyword;
    Equal => "=", "Equal", Operator;
    Equals => "T_EQUALS", "Equals", Operator;
    Eval => "T_EVAL", "Eval", Keyword;
    ExclamationMark => "!", "Exclamation_Mark", Operator;
    Exit => "T_EXIT", "Exit", Keyword;
    Extends => "T_EXTENDS", "Extends", Keyword;
    File => "T_FILE", "File", Constant;
    Final => "T_FINAL", "Final", Keyword;
    Finally => "T_FINALLY", "Finally", Keyword;
    For => "T_FOR", "For", Keyword;
    Foreach => "T_FOREACH", "Foreach", Keyword;
    FuncC => "T_FUNC_C", "Func_C", Constant;
    Function => "T_FUNCTION", "Function", Keyword;
    Global => "T_GLOBAL", "Global", Keyword;
    Goto => "T_GOTO", "Goto", Keyword;
    Gt => ">", "Gt", Operator;
    HaltCompiler => "T_HALT_COMPILER", "Halt_Compiler", Keyword;
    If => "T_IF", "If", Keyword;
    Implements => "T_IMPLEMENTS", "Implements", Keyword;
    In => "T_IN", "In", Keyword;
    Inc => "T_INC", "Inc", Operator;
    Include => "T_INCLUDE", "Include", Keyword;
    IncludeOnce => "T_INCLUDE_ONCE", "Include_Once", Keyword;
    InlineHtml => "T_INLINE_HTML", "Inline_Html", Default;
    Instanceof => "T_INSTANCEOF", "Instanceof", Keyword;
    Insteadof => "T_INSTEADOF", "Insteadof", Keyword;
    IntCast => "T_INT_CAST", "Int_Cast", Operator;
    Interface => "T_INTERFACE", "Interface", Keyword;
    IsEqual => "T_IS_EQUAL", "Is_Equal", Operator;
    IsGreaterOrEqual => "T_IS_GREATER_OR_EQUAL", "Is_Greater_Or_Equal", Operator;
    IsIdentical => "T_IS_IDENTICAL", "Is_Identical", Operator;
    IsNotEqual => "T_IS_NOT_EQUAL", "Is_Not_Equal", Operator;
    IsNotIdentical => "T_IS_NOT_IDENTICAL", "Is_Not_Identical", Operator;
    IsSmallerOrEqual => "T_IS_SMALLER_OR_EQUAL", "Is_Smaller_Or_Equal", Operator;
    Isset => "T_ISSET", "Isset", Keyword;
    Join => "T_JOIN", "Join", Keyword;
    LambdaArrow => "T_LAMBDA_ARROW", "Lambda_Arrow", Operator;
    LambdaCp => "T_LAMBDA_CP", "Lambda_Cp", Default;
    LambdaOp => "T_LAMBDA_OP", "Lambda_Op", Default;
    Line => "T_LINE", "Line", Constant;
    List => "T_LIST", "List", Keyword;
    Lnumber => "T_LNUMBER", "Lnumber", Constant;
    LogicalAnd => "T_LOGICAL_AND", "Logical_And", Operator;
    LogicalOr => "T_LOGICAL_OR", "Logical_Or", Operator;
    LogicalXor => "T_LOGICAL_XOR", "Logical_Xor", Operator;
    Lt => "<", "Lt", Operator;
    MethodC => "T_METHOD_C", "Method_C", Constant;
    Minus => "-", "Minus", Operator;
    MinusEqual => "T_MINUS_EQUAL", "Minus_Equal", Operator;
    ModEqual => "T_MOD_EQUAL", "Mod_Equal", Operator;
    MulEqual => "T_MUL_EQUAL", "Mul_Equal", Operator;
    Mult => "*", "Mult", Operator;
    Namespace => "T_NAMESPACE", "Namespace", Keyword;
    New => "T_NEW", "New", Keyword;
    NsC => "T_NS_C", "Ns_C", Constant;
    NsSeparator => "T_NS_SEPARATOR", "Ns_Separator", Default;
    NullsafeObjectOperator => "T_NULLSAFE_OBJECT_OPERATOR", "Nullsafe_Object_Operator", Operator;
    NumString => "T_NUM_STRING", "Num_String", String;
    ObjectCast => "T_OBJECT_CAST", "Object_Cast", Operator;
    ObjectOperator => "T_OBJECT_OPERATOR", "Object_Operator", Operator;
    Onumber => "T_ONUMBER", "Onumber", Constant;
    OpenBracket => "(", "Open_Bracket", Default;
    OpenCurly => "{", "Open_Curly", Default;
    OpenSquare => "[", "Open_Square", Default;
    OpenTag => "T_OPEN_TAG", "Open_Tag", Default;
    OpenTagWithEcho => "T_OPEN_TAG_WITH_ECHO", "Open_Tag_With_Echo", Default;
    OrEqual => "T_OR_EQUAL", "Or_Equal", Operator;
    Percent => "%", "Percent", Operator;
    Pipe => "|", "Pipe", Operator;
    Plus => "+", "Plus", Operator;
    PlusEqual => "T_PLUS_EQUAL", "Plus_Equal", Operator;
    Pow => "T_POW", "Pow", Operator;
    PowEqual => "T_POW_EQUAL", "Pow_Equal", Operator;
    Print => "T_PRINT", "Print", Keyword;
    Private => "T_PRIVATE", "Private", Keyword;
    Protected => "T_PROTECTED", "Protected", Keyword;
    Public => "T_PUBLIC", "Public", Keyword;
    QuestionMark => "?", "Question_Mark", Operator;
    Require => "T_REQUIRE", "Require", Keyword;
    RequireOnce => "T_REQUIRE_ONCE", "Require_Once", Keyword;
    Return => "T_RETURN", "Return", Keyword;
    Semicolon => ";", "Semicolon", Default;
    Shape => "T_SHAPE", "Shape", Keyword;
    Sl => "T_SL", "Sl", Operator;
    SlEqual => "T_SL_EQUAL", "Sl_Equal", Operator;
    Spaceship => "T_SPACESHIP", "Spaceship", Operator;
    Sr => "T_SR", "Sr", Operator;
    SrEqual => "T_SR_EQUAL", "Sr_Equal", Operator;
    StartHeredoc => "T_START_HEREDOC", "Start_Heredoc", String;
    Static => "T_STATIC", "Static", Keyword;
    String => "T_STRING", "String", Default;
    StringCast => "T_STRING_CAST", "String_Cast", Operator;
    StringVarname => "T_STRING_VARNAME", "String_Varname", Variable;
    Super => "T_SUPER", "Super", Keyword;
    Switch => "T_SWITCH", "Switch", Keyword;
    Throw => "T_THROW", "Throw", Keyword;
    Tilde => "~", "Tilde", Operator;
    Trait => "T_TRAIT", "Trait", Keyword;
    TraitC => "T_TRAIT_C", "Trait_C", Constant;
    Try => "T_TRY", "Try", Keyword;
    Tuple => "T_TUPLE", "Tuple", Keyword;
    Type => "T_TYPE", "Type", Keyword;
    TypelistGt => "T_TYPELIST_GT", "Typelist_Gt", Default;
    TypelistLt => "T_TYPELIST_LT", "Typelist_Lt", Default;
    Unset => "T_UNSET", "Unset", Keyword;
    UnsetCast => "T_UNSET_CAST", "Unset_Cast", Operator;
    Use => "T_USE", "Use", Keyword;
    UseFunction => "T_USE_FUNCTION", "Use_Function", Keyword;
    Var => "T_VAR", "Var", Keyword;
    Variable => "T_VARIABLE", "Variable", Variable;
    Where => "T_WHERE", "Where", Keyword;
    While => "T_WHILE", "While", Keyword;
    Whitespace => "T_WHITESPACE", "Whitespace", Default;
    XhpAttribute => "T_XHP_ATTRIBUTE", "Xhp_Attribute", Keyword;
    XhpCategory => "T_XHP_CATEGORY", "Xhp_Category", Keyword;
    XhpCategoryLabel => "T_XHP_CATEGORY_LABEL", "Xhp_Category_Label", Default;
    XhpChildren => "T_XHP_CHILDREN", "Xhp_Children", Keyword;
    XhpLabel => "T_XHP_LABEL", "Xhp_Label", Default;
    XhpRequired => "T_XHP_REQUIRED", "Xhp_Required", Keyword;
    XhpTagGt => "T_XHP_TAG_GT", "Xhp_Tag_Gt", Default;
    XhpTagLt => "T_XHP_TAG_LT", "Xhp_Tag_Lt", Default;
    XhpText => "T_XHP_TEXT", "Xhp_Text", String;
    XorEqual => "T_XOR_EQUAL", "Xor_Equal", Operator;
    Yield => "T_YIELD", "Yield", Keyword;
    YieldFrom => "T_YIELD_FROM", "Yield_From", Keyword;
}

/// Alternate raw names some lexers emit for an existing kind
const RAW_ALIASES: &[(&str, TokenKind)] = &[("T_DOUBLE_COLON", TokenKind::DoubleColon)];

static RAW_LOOKUP: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();

fn raw_lookup() -> &'static HashMap<&'static str, TokenKind> {
    RAW_LOOKUP.get_or_init(|| {
        let mut lookup = HashMap::with_capacity(TokenKind::ALL.len() + RAW_ALIASES.len());
        for &kind in TokenKind::ALL {
            lookup.insert(kind.raw_name(), kind);
        }
        for &(raw, kind) in RAW_ALIASES {
            lookup.insert(raw, kind);
        }
        lookup
    })
}

// ============================================================================
// CLASSIFICATION AND ATTRIBUTES
// ============================================================================

impl TokenKind {
    /// Map a raw lexer kind to its catalog entry, `None` when it is outside the catalog
    pub fn from_raw(raw: &str) -> Option<TokenKind> {
        raw_lookup().get(raw).copied()
    }

    /// Kinds whose construct runs up to the next statement terminator
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Return
                | TokenKind::Echo
                | TokenKind::Print
                | TokenKind::Throw
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Goto
                | TokenKind::Global
                | TokenKind::Const
                | TokenKind::List
                | TokenKind::Use
                | TokenKind::UseFunction
                | TokenKind::Include
                | TokenKind::IncludeOnce
                | TokenKind::Require
                | TokenKind::RequireOnce
                | TokenKind::Yield
                | TokenKind::YieldFrom
        )
    }

    /// Keywords that introduce a compound body
    pub fn is_block_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Elseif
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Switch
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Trait
                | TokenKind::Enum
                | TokenKind::Namespace
                | TokenKind::Declare
        )
    }

    pub fn opens_scope(self) -> bool {
        self.is_opening_delimiter() || self.is_block_keyword()
    }

    pub fn closes_scope(self) -> bool {
        matches!(
            self,
            TokenKind::CloseCurly
                | TokenKind::CloseBracket
                | TokenKind::LambdaCp
                | TokenKind::CloseSquare
                | TokenKind::TypelistGt
        )
    }

    pub fn is_opening_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::OpenCurly
                | TokenKind::CurlyOpen
                | TokenKind::DollarOpenCurlyBraces
                | TokenKind::OpenBracket
                | TokenKind::LambdaOp
                | TokenKind::OpenSquare
                | TokenKind::TypelistLt
        )
    }

    /// Delimiter family for bracket-like kinds, `None` for everything else
    pub fn delimiter_class(self) -> Option<DelimiterClass> {
        match self {
            TokenKind::OpenCurly
            | TokenKind::CurlyOpen
            | TokenKind::DollarOpenCurlyBraces
            | TokenKind::CloseCurly => Some(DelimiterClass::Brace),
            TokenKind::OpenBracket
            | TokenKind::LambdaOp
            | TokenKind::CloseBracket
            | TokenKind::LambdaCp => Some(DelimiterClass::Paren),
            TokenKind::OpenSquare | TokenKind::CloseSquare => Some(DelimiterClass::Square),
            TokenKind::TypelistLt | TokenKind::TypelistGt => Some(DelimiterClass::TypeList),
            _ => None,
        }
    }

    /// Whitespace and comments carry no syntax
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    pub fn is_visibility(self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Protected | TokenKind::Private
        )
    }

    /// Declaration modifiers that may precede `function` or `class`
    pub fn is_modifier(self) -> bool {
        self.is_visibility()
            || matches!(
                self,
                TokenKind::Static | TokenKind::Abstract | TokenKind::Final | TokenKind::Async
            )
    }

    pub fn is_include(self) -> bool {
        matches!(
            self,
            TokenKind::Include
                | TokenKind::IncludeOnce
                | TokenKind::Require
                | TokenKind::RequireOnce
        )
    }

    /// Declaration keywords for class-like structures
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
