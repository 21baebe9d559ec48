//! The grammar resolution service.
//!
//! A [`GrammarBuilder`] collects declared items; [`GrammarBuilder::build`]
//! validates names and references once and produces an immutable
//! [`Grammar`] that every later stage reads from. Nothing is registered
//! after that point.

use std::collections::HashMap;

use kreia_foundation::{Error, ErrorContext, ItemKind, Name, Result};

use crate::definition::Definition;
use crate::item::{LockingArg, Macro, Rule, TokenDef, VirtualLexerUsage};
use crate::node::NodeKind;

// =============================================================================
// TokenSource
// =============================================================================

/// Where a token kind comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSource<'g> {
    /// A declared token definition.
    Defined(&'g TokenDef),
    /// A token emitted by a virtual lexer.
    Virtual(&'g VirtualLexerUsage),
}

// =============================================================================
// GrammarBuilder
// =============================================================================

/// Collects grammar items before validation.
#[derive(Clone, Debug, Default)]
pub struct GrammarBuilder {
    tokens: Vec<TokenDef>,
    rules: Vec<Rule>,
    macros: Vec<Macro>,
    virtual_lexers: Vec<VirtualLexerUsage>,
}

impl GrammarBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token definition.
    #[must_use]
    pub fn with_token(mut self, token: TokenDef) -> Self {
        self.tokens.push(token);
        self
    }

    /// Adds a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a macro.
    #[must_use]
    pub fn with_macro(mut self, definition: Macro) -> Self {
        self.macros.push(definition);
        self
    }

    /// Adds a virtual lexer usage.
    #[must_use]
    pub fn with_virtual_lexer(mut self, usage: VirtualLexerUsage) -> Self {
        self.virtual_lexers.push(usage);
        self
    }

    /// Validates every item and produces the immutable grammar.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` for repeated names and `UnknownReference` or
    /// `ArityMismatch` for references that do not resolve. Reference errors
    /// carry the owning rule or macro in their context.
    pub fn build(self) -> Result<Grammar> {
        let mut token_index = HashMap::with_capacity(self.tokens.len());
        for (index, token) in self.tokens.iter().enumerate() {
            if token_index.insert(token.name.clone(), index).is_some() {
                return Err(Error::duplicate_name(ItemKind::Token, token.name.as_ref()));
            }
        }

        let mut lexer_names = HashMap::new();
        for (index, usage) in self.virtual_lexers.iter().enumerate() {
            if lexer_names.insert(usage.name.clone(), index).is_some() {
                return Err(Error::duplicate_name(ItemKind::VirtualLexer, usage.name.as_ref()));
            }
            if let Some(exposed) = usage.exposed_tokens.iter().find(|t| token_index.contains_key(*t)) {
                return Err(Error::duplicate_name(ItemKind::Token, exposed.as_ref()));
            }
        }

        let mut rule_index = HashMap::with_capacity(self.rules.len());
        for (index, rule) in self.rules.iter().enumerate() {
            if rule_index.insert(rule.name().clone(), index).is_some() {
                return Err(Error::duplicate_name(ItemKind::Rule, rule.name().as_ref()));
            }
        }

        let mut macro_index = HashMap::with_capacity(self.macros.len());
        for (index, definition) in self.macros.iter().enumerate() {
            if macro_index.insert(definition.name().clone(), index).is_some() {
                return Err(Error::duplicate_name(ItemKind::Macro, definition.name().as_ref()));
            }
        }

        let grammar = Grammar {
            tokens: self.tokens,
            token_index,
            rules: self.rules,
            rule_index,
            macros: self.macros,
            macro_index,
            virtual_lexers: self.virtual_lexers,
        };
        grammar.validate()?;
        Ok(grammar)
    }
}

// =============================================================================
// Grammar
// =============================================================================

/// A validated, read-only grammar.
#[derive(Clone, Debug)]
pub struct Grammar {
    tokens: Vec<TokenDef>,
    token_index: HashMap<Name, usize>,
    rules: Vec<Rule>,
    rule_index: HashMap<Name, usize>,
    macros: Vec<Macro>,
    macro_index: HashMap<Name, usize>,
    virtual_lexers: Vec<VirtualLexerUsage>,
}

impl Grammar {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Resolves a token kind, declared or exposed by a virtual lexer.
    #[must_use]
    pub fn get_token(&self, name: &str) -> Option<TokenSource<'_>> {
        if let Some(def) = self.get_token_def(name) {
            return Some(TokenSource::Defined(def));
        }
        self.virtual_lexers
            .iter()
            .find(|usage| usage.exposes(name))
            .map(TokenSource::Virtual)
    }

    /// Returns the declared definition of a token.
    #[must_use]
    pub fn get_token_def(&self, name: &str) -> Option<&TokenDef> {
        self.token_index.get(name).map(|&index| &self.tokens[index])
    }

    /// Returns a rule by name.
    #[must_use]
    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rule_index.get(name).map(|&index| &self.rules[index])
    }

    /// Returns a macro by name.
    #[must_use]
    pub fn get_macro(&self, name: &str) -> Option<&Macro> {
        self.macro_index.get(name).map(|&index| &self.macros[index])
    }

    /// Returns true if tokens of kind `name` are skipped by the lexer.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.get_token_def(name).is_some_and(|t| t.ignore)
    }

    /// Returns rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns declared token definitions in declaration order.
    #[must_use]
    pub fn tokens(&self) -> &[TokenDef] {
        &self.tokens
    }

    /// Returns macros in declaration order.
    #[must_use]
    pub fn macros(&self) -> &[Macro] {
        &self.macros
    }

    /// Returns virtual lexer usages in declaration order.
    #[must_use]
    pub fn virtual_lexers(&self) -> &[VirtualLexerUsage] {
        &self.virtual_lexers
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            let owner = Owner {
                label: format!("rule {}", rule.name()),
                locking_args: rule.locking_args(),
                formal: None,
            };
            self.validate_owner(&owner, rule.definition())?;
        }
        for definition in &self.macros {
            let owner = Owner {
                label: format!("macro {}", definition.name()),
                locking_args: definition.locking_args(),
                formal: Some(definition),
            };
            self.validate_owner(&owner, definition.definition())?;
        }
        Ok(())
    }

    fn validate_owner(&self, owner: &Owner<'_>, definition: &Definition) -> Result<()> {
        for locking in owner.locking_args {
            self.require_token(&locking.token_name)
                .map_err(|e| e.with_context(ErrorContext::new().with_owner(&owner.label)))?;
        }
        self.validate_definition(owner, definition)
            .map_err(|e| e.with_context(ErrorContext::new().with_owner(&owner.label)))
    }

    fn require_token(&self, name: &str) -> Result<()> {
        match self.get_token(name) {
            Some(_) => Ok(()),
            None => Err(Error::unknown_reference(ItemKind::Token, name)),
        }
    }

    fn validate_definition(&self, owner: &Owner<'_>, definition: &Definition) -> Result<()> {
        for node in definition {
            match node.kind() {
                NodeKind::Consume(names) => {
                    for name in names.iter() {
                        self.require_token(name)?;
                    }
                }
                NodeKind::Or(choices) => {
                    for choice in choices.iter() {
                        self.validate_definition(owner, choice)?;
                    }
                }
                NodeKind::Subrule(name) => {
                    if self.get_rule(name).is_none() {
                        return Err(Error::unknown_reference(ItemKind::Rule, name.as_ref()));
                    }
                }
                NodeKind::MacroCall { macro_name, args } => {
                    let callee = self
                        .get_macro(macro_name)
                        .ok_or_else(|| Error::unknown_reference(ItemKind::Macro, macro_name.as_ref()))?;
                    if callee.args().len() != args.len() {
                        return Err(Error::arity_mismatch(
                            macro_name.as_ref(),
                            callee.args().len(),
                            args.len(),
                        ));
                    }
                    // arguments are expanded in the caller's scope
                    for arg in args.iter() {
                        self.validate_definition(owner, arg)?;
                    }
                }
                NodeKind::Var(name) => {
                    if !owner.formal.is_some_and(|m| m.has_arg(name)) {
                        return Err(Error::unknown_reference(ItemKind::Arg, name.as_ref()));
                    }
                }
                NodeKind::LockingVar(name) => {
                    if !owner.locking_args.iter().any(|l| &l.name == name) {
                        return Err(Error::unknown_reference(ItemKind::LockingArg, name.as_ref()));
                    }
                }
                NodeKind::Paren(inner) => self.validate_definition(owner, inner)?,
            }
        }
        Ok(())
    }
}

struct Owner<'a> {
    label: String,
    locking_args: &'a [LockingArg],
    formal: Option<&'a Macro>,
}
