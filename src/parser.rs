//! Recursive-descent parser over the token stream.
//!
//! Builds the concrete parse tree bottom-up, preserving bracket, comma,
//! and colon tokens as Delimiter nodes so the tree can be re-rendered.
//! Statement dispatch needs at most three tokens of lookahead, served by
//! `peek_at` rather than cursor save/restore.

use anyhow::{anyhow, Result};

use crate::token::{Token, TokenKind};
use crate::tree::{NodeLabel, ParseNode};

const ASSIGN_OPERATORS: [&str; 7] = ["=", "+=", "-=", "*=", "/=", "%=", "//="];
const COMPARISON_OPERATORS: [&str; 6] = ["<", ">", "==", ">=", "<=", "!="];

pub fn parse_tokens(tokens: Vec<Token>) -> Result<ParseNode> {
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::Program);
        while !self.at_end() {
            if self.kind_is(TokenKind::Newline) {
                self.consume()?;
                continue;
            }
            node.add_child(self.parse_statement()?);
        }
        Ok(node)
    }

    // ---- token cursor -------------------------------------------------

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn kind_is(&self, kind: TokenKind) -> bool {
        matches!(self.current(), Some(token) if token.kind == kind)
    }

    fn token_is(&self, kind: TokenKind, lexeme: &str) -> bool {
        matches!(self.current(), Some(token) if token.kind == kind && token.lexeme == lexeme)
    }

    fn kind_at(&self, offset: usize, kind: TokenKind) -> bool {
        matches!(self.peek_at(offset), Some(token) if token.kind == kind)
    }

    fn token_at(&self, offset: usize, kind: TokenKind, lexeme: &str) -> bool {
        matches!(self.peek_at(offset), Some(token) if token.kind == kind && token.lexeme == lexeme)
    }

    fn assign_op_at(&self, offset: usize) -> bool {
        matches!(
            self.peek_at(offset),
            Some(token)
                if token.kind == TokenKind::Operator
                    && ASSIGN_OPERATORS.contains(&token.lexeme.as_str())
        )
    }

    fn consume(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            None => Err(self.syntax_error("Unexpected end of input")),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.kind_is(kind) {
            self.consume()
        } else {
            Err(self.syntax_error(message))
        }
    }

    fn expect_token(&mut self, kind: TokenKind, lexeme: &str, message: &str) -> Result<Token> {
        if self.token_is(kind, lexeme) {
            self.consume()
        } else {
            Err(self.syntax_error(message))
        }
    }

    fn skip_newlines(&mut self) {
        while self.kind_is(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    fn syntax_error(&self, message: &str) -> anyhow::Error {
        match self.current() {
            Some(token) => anyhow!(
                "Syntax Error at line {} near '{}': {message}",
                token.line,
                token.lexeme
            ),
            None => {
                let line = self.tokens.last().map(|token| token.line).unwrap_or(0);
                anyhow!("Syntax Error at line {line} near 'EOF': {message}")
            }
        }
    }

    /// Skips ahead to the next statement boundary. Reserved for a future
    /// error-recovery mode; parsing currently aborts on the first error.
    #[allow(dead_code)]
    fn recover_to_statement_boundary(&mut self) {
        while let Some(token) = self.current() {
            let at_boundary = token.kind == TokenKind::Newline
                || (token.kind == TokenKind::Keyword
                    && matches!(
                        token.lexeme.as_str(),
                        "if" | "while" | "for" | "def" | "class"
                    ));
            if at_boundary {
                break;
            }
            self.pos += 1;
        }
    }

    // ---- statements ---------------------------------------------------

    fn parse_statement(&mut self) -> Result<ParseNode> {
        self.skip_newlines();
        if self.token_is(TokenKind::Keyword, "if") {
            return self.parse_if_statement();
        }
        if self.token_is(TokenKind::Keyword, "while") {
            return self.parse_while_statement();
        }
        if self.token_is(TokenKind::Keyword, "for") {
            return self.parse_for_statement();
        }
        if self.token_is(TokenKind::Keyword, "def") {
            return self.parse_function_def();
        }
        if self.token_is(TokenKind::Keyword, "class") {
            return self.parse_class_def();
        }
        if self.token_is(TokenKind::Keyword, "return") {
            return self.parse_return_statement();
        }
        if self.token_is(TokenKind::Keyword, "pass") {
            return self.single_keyword_statement(NodeLabel::PassStatement);
        }
        if self.token_is(TokenKind::Keyword, "break") {
            return self.single_keyword_statement(NodeLabel::BreakStatement);
        }
        if self.token_is(TokenKind::Keyword, "continue") {
            return self.single_keyword_statement(NodeLabel::ContinueStatement);
        }
        if self.token_is(TokenKind::Keyword, "import") || self.token_is(TokenKind::Keyword, "from")
        {
            return self.parse_import_statement();
        }
        if self.kind_is(TokenKind::Identifier) {
            // bounded lookahead: attribute target, plain target, or call
            if self.token_at(1, TokenKind::Delimiter, ".")
                && self.kind_at(2, TokenKind::Identifier)
                && self.assign_op_at(3)
            {
                return self.parse_assignment();
            }
            if self.assign_op_at(1) {
                return self.parse_assignment();
            }
            if self.token_at(1, TokenKind::Delimiter, "(") {
                return self.parse_function_call_statement();
            }
        }
        self.parse_expression_statement()
    }

    /// The body after a `:`: either NEWLINE INDENT statements DEDENT, or
    /// one inline statement. End of input is a valid block terminator.
    fn parse_block_or_simple_suite(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::Suite);
        if self.kind_is(TokenKind::Newline) {
            self.consume()?;
            if !self.kind_is(TokenKind::Indent) {
                return Err(self.syntax_error("Expected INDENT after NEWLINE for block suite"));
            }
            self.consume()?;
            while !self.kind_is(TokenKind::Dedent) && !self.at_end() {
                self.skip_newlines();
                if self.kind_is(TokenKind::Dedent) || self.at_end() {
                    break;
                }
                node.add_child(self.parse_statement()?);
            }
            if self.kind_is(TokenKind::Dedent) {
                self.consume()?;
            } else if !self.at_end() {
                return Err(self.syntax_error("Expected DEDENT at end of block"));
            }
        } else if self.starts_simple_statement() {
            node.add_child(self.parse_statement()?);
        } else {
            return Err(self.syntax_error(
                "Expected NEWLINE+INDENT for block or a simple statement after ':'",
            ));
        }
        Ok(node)
    }

    fn starts_simple_statement(&self) -> bool {
        if self.kind_is(TokenKind::Identifier) {
            return true;
        }
        matches!(self.current(), Some(token) if token.kind == TokenKind::Keyword
            && matches!(
                token.lexeme.as_str(),
                "return" | "pass" | "break" | "continue" | "import" | "from" | "if" | "while"
                    | "for" | "def" | "class"
            ))
    }

    fn keyword_node(&mut self) -> Result<ParseNode> {
        let token = self.consume()?;
        Ok(ParseNode::with_value(NodeLabel::Keyword, token.lexeme))
    }

    fn delimiter_node(&mut self) -> Result<ParseNode> {
        let token = self.consume()?;
        Ok(ParseNode::with_value(NodeLabel::Delimiter, token.lexeme))
    }

    fn parse_if_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::IfStatement);
        node.add_child(self.keyword_node()?);
        node.add_child(self.parse_test()?);
        self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after if condition")?;
        node.add_child(self.parse_block_or_simple_suite()?);

        while self.token_is(TokenKind::Keyword, "elif") {
            let mut clause = ParseNode::new(NodeLabel::ElifClause);
            clause.add_child(self.keyword_node()?);
            clause.add_child(self.parse_test()?);
            self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after elif condition")?;
            clause.add_child(self.parse_block_or_simple_suite()?);
            node.add_child(clause);
        }

        if self.token_is(TokenKind::Keyword, "else") {
            let mut clause = ParseNode::new(NodeLabel::ElseClause);
            clause.add_child(self.keyword_node()?);
            self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after 'else'")?;
            clause.add_child(self.parse_block_or_simple_suite()?);
            node.add_child(clause);
        }

        Ok(node)
    }

    fn parse_while_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::WhileStatement);
        node.add_child(self.keyword_node()?);
        node.add_child(self.parse_test()?);
        self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after while condition")?;
        node.add_child(self.parse_block_or_simple_suite()?);
        Ok(node)
    }

    fn parse_for_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::ForStatement);
        node.add_child(self.keyword_node()?);
        let target = self.expect_kind(TokenKind::Identifier, "Expected identifier after 'for'")?;
        node.add_child(ParseNode::with_value(NodeLabel::Identifier, target.lexeme));
        let in_kw = self.expect_token(TokenKind::Keyword, "in", "Expected 'in' after for variable")?;
        node.add_child(ParseNode::with_value(NodeLabel::Keyword, in_kw.lexeme));
        node.add_child(self.parse_test()?);
        self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after for statement")?;
        node.add_child(self.parse_block_or_simple_suite()?);
        Ok(node)
    }

    fn parse_function_def(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::FunctionDefinition);
        node.add_child(self.keyword_node()?);
        let name = self.expect_kind(TokenKind::Identifier, "Expected function name after 'def'")?;
        node.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));

        let open = self.expect_token(TokenKind::Delimiter, "(", "Expected '(' after function name")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, open.lexeme));

        let mut params = ParseNode::new(NodeLabel::Parameters);
        if !self.token_is(TokenKind::Delimiter, ")") {
            loop {
                let param = self.expect_kind(TokenKind::Identifier, "Expected parameter name")?;
                params.add_child(ParseNode::with_value(NodeLabel::Parameter, param.lexeme));
                if self.token_is(TokenKind::Delimiter, ",") {
                    params.add_child(self.delimiter_node()?);
                    if self.token_is(TokenKind::Delimiter, ")") {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        node.add_child(params);

        let close = self.expect_token(TokenKind::Delimiter, ")", "Expected ')' after parameters")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
        let colon =
            self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after function declaration")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, colon.lexeme));

        node.add_child(self.parse_block_or_simple_suite()?);
        Ok(node)
    }

    fn parse_class_def(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::ClassDefinition);
        node.add_child(self.keyword_node()?);
        let name = self.expect_kind(TokenKind::Identifier, "Expected class name after 'class'")?;
        node.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));

        if self.token_is(TokenKind::Delimiter, "(") {
            node.add_child(self.delimiter_node()?);
            let parent =
                self.expect_kind(TokenKind::Identifier, "Expected parent class name")?;
            node.add_child(ParseNode::with_value(NodeLabel::Identifier, parent.lexeme));
            let close =
                self.expect_token(TokenKind::Delimiter, ")", "Expected ')' after parent class name")?;
            node.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
        }

        let colon =
            self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after class declaration")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, colon.lexeme));
        node.add_child(self.parse_block_or_simple_suite()?);
        Ok(node)
    }

    fn parse_return_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::ReturnStatement);
        node.add_child(self.keyword_node()?);
        let bare = self.at_end()
            || self.kind_is(TokenKind::Newline)
            || self.kind_is(TokenKind::Dedent)
            || self.token_is(TokenKind::Delimiter, ";");
        if !bare {
            node.add_child(self.parse_test()?);
        }
        Ok(node)
    }

    fn single_keyword_statement(&mut self, label: NodeLabel) -> Result<ParseNode> {
        let mut node = ParseNode::new(label);
        node.add_child(self.keyword_node()?);
        Ok(node)
    }

    fn parse_import_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::ImportStatement);
        let keyword = self.consume()?;
        let from_form = keyword.lexeme == "from";
        node.add_child(ParseNode::with_value(NodeLabel::Keyword, keyword.lexeme));

        if from_form {
            node.add_child(self.parse_dotted_name()?);
            self.expect_token(TokenKind::Keyword, "import", "Expected 'import' after module name")?;
            if self.token_is(TokenKind::Operator, "*") {
                let star = self.consume()?;
                node.add_child(ParseNode::with_value(NodeLabel::ImportAll, star.lexeme));
            } else {
                let name = self.expect_kind(TokenKind::Identifier, "Expected name to import")?;
                node.add_child(ParseNode::with_value(NodeLabel::ImportName, name.lexeme));
                self.parse_optional_alias(&mut node)?;
            }
        } else {
            node.add_child(self.parse_dotted_name()?);
            self.parse_optional_alias(&mut node)?;
            while self.token_is(TokenKind::Delimiter, ",") {
                self.consume()?;
                node.add_child(self.parse_dotted_name()?);
                self.parse_optional_alias(&mut node)?;
            }
        }
        Ok(node)
    }

    fn parse_optional_alias(&mut self, node: &mut ParseNode) -> Result<()> {
        if self.token_is(TokenKind::Keyword, "as") {
            self.consume()?;
            let alias = self.expect_kind(TokenKind::Identifier, "Expected identifier after 'as'")?;
            node.add_child(ParseNode::with_value(NodeLabel::Alias, alias.lexeme));
        }
        Ok(())
    }

    fn parse_dotted_name(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::DottedName);
        let first = self.expect_kind(TokenKind::Identifier, "Expected identifier")?;
        node.add_child(ParseNode::with_value(NodeLabel::NamePart, first.lexeme));
        while self.token_is(TokenKind::Delimiter, ".") {
            node.add_child(self.delimiter_node()?);
            let part = self.expect_kind(TokenKind::Identifier, "Expected identifier after '.'")?;
            node.add_child(ParseNode::with_value(NodeLabel::NamePart, part.lexeme));
        }
        Ok(node)
    }

    fn parse_assignment(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::Assignment);

        let mut target = ParseNode::new(NodeLabel::IdentifierList);
        if self.kind_is(TokenKind::Identifier) {
            if self.token_at(1, TokenKind::Delimiter, ".") {
                target.add_child(self.parse_atom_expr()?);
            } else {
                let name = self.consume()?;
                target.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));
            }
        } else {
            return Err(self.syntax_error("Expected identifier or attribute access"));
        }
        while self.token_is(TokenKind::Delimiter, ",") {
            self.consume()?;
            let name = self.expect_kind(TokenKind::Identifier, "Expected identifier after ','")?;
            target.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));
        }
        node.add_child(target);

        let op = self.consume()?;
        node.add_child(ParseNode::with_value(NodeLabel::AssignOp, op.lexeme));

        let first = self.parse_test()?;
        if self.token_is(TokenKind::Delimiter, ",") {
            let mut values = ParseNode::new(NodeLabel::ExpressionList);
            values.add_child(first);
            while self.token_is(TokenKind::Delimiter, ",") {
                self.consume()?;
                values.add_child(self.parse_test()?);
            }
            node.add_child(values);
        } else {
            node.add_child(first);
        }
        Ok(node)
    }

    fn parse_function_call_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::FunctionCallStatement);
        if self.kind_is(TokenKind::Identifier) {
            if self.token_at(1, TokenKind::Delimiter, ".") {
                node.add_child(self.parse_dotted_name()?);
            } else {
                let name = self.consume()?;
                node.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));
            }
        } else {
            return Err(self.syntax_error("Expected function name"));
        }

        let open = self.expect_token(TokenKind::Delimiter, "(", "Expected '(' after function name")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, open.lexeme));
        node.add_child(self.parse_call_arguments()?);
        let close =
            self.expect_token(TokenKind::Delimiter, ")", "Expected ')' after function arguments")?;
        node.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
        Ok(node)
    }

    fn parse_call_arguments(&mut self) -> Result<ParseNode> {
        let mut args = ParseNode::new(NodeLabel::Arguments);
        if !self.token_is(TokenKind::Delimiter, ")") {
            args.add_child(self.parse_test()?);
            while self.token_is(TokenKind::Delimiter, ",") {
                args.add_child(self.delimiter_node()?);
                if self.token_is(TokenKind::Delimiter, ")") {
                    break;
                }
                args.add_child(self.parse_test()?);
            }
        }
        Ok(args)
    }

    fn parse_expression_statement(&mut self) -> Result<ParseNode> {
        let mut node = ParseNode::new(NodeLabel::ExpressionStatement);
        node.add_child(self.parse_test()?);
        Ok(node)
    }

    // ---- expressions --------------------------------------------------

    fn parse_test(&mut self) -> Result<ParseNode> {
        self.parse_ternary()
    }

    /// Exactly three operand children: value-if-true, condition,
    /// value-if-false. The `if`/`else` keyword tokens are consumed, not
    /// kept, matching how BinaryOp and UnaryOp fold their operator into
    /// the node itself.
    fn parse_ternary(&mut self) -> Result<ParseNode> {
        let then_expr = self.parse_or_test()?;
        if self.token_is(TokenKind::Keyword, "if") {
            self.consume()?;
            let mut node = ParseNode::new(NodeLabel::TernaryOp);
            node.add_child(then_expr);
            node.add_child(self.parse_or_test()?);
            self.expect_token(
                TokenKind::Keyword,
                "else",
                "Expected 'else' in conditional expression",
            )?;
            node.add_child(self.parse_test()?);
            return Ok(node);
        }
        Ok(then_expr)
    }

    fn parse_or_test(&mut self) -> Result<ParseNode> {
        let mut node = self.parse_and_test()?;
        while self.token_is(TokenKind::Keyword, "or") {
            let op = self.consume()?;
            let mut op_node = ParseNode::with_value(NodeLabel::BinaryOp, op.lexeme);
            op_node.add_child(node);
            op_node.add_child(self.parse_and_test()?);
            node = op_node;
        }
        Ok(node)
    }

    fn parse_and_test(&mut self) -> Result<ParseNode> {
        let mut node = self.parse_not_test()?;
        while self.token_is(TokenKind::Keyword, "and") {
            let op = self.consume()?;
            let mut op_node = ParseNode::with_value(NodeLabel::BinaryOp, op.lexeme);
            op_node.add_child(node);
            op_node.add_child(self.parse_not_test()?);
            node = op_node;
        }
        Ok(node)
    }

    fn parse_not_test(&mut self) -> Result<ParseNode> {
        if self.token_is(TokenKind::Keyword, "not") {
            let op = self.consume()?;
            let mut node = ParseNode::with_value(NodeLabel::UnaryOp, op.lexeme);
            node.add_child(self.parse_not_test()?);
            return Ok(node);
        }
        self.parse_comparison()
    }

    /// Exactly one comparison operator per Comparison node; `a < b < c`
    /// is not a chain and the second operator is a syntax error upstream.
    fn parse_comparison(&mut self) -> Result<ParseNode> {
        let left = self.parse_arith_expr()?;
        let comparing = matches!(
            self.current(),
            Some(token)
                if token.kind == TokenKind::Operator
                    && COMPARISON_OPERATORS.contains(&token.lexeme.as_str())
        );
        if comparing {
            let mut node = ParseNode::new(NodeLabel::Comparison);
            node.add_child(left);
            let op = self.consume()?;
            node.add_child(ParseNode::with_value(NodeLabel::ComparisonOp, op.lexeme));
            node.add_child(self.parse_arith_expr()?);
            return Ok(node);
        }
        Ok(left)
    }

    /// Additive level: two or more operands flatten into one
    /// ExpressionList with childless BinaryOp nodes interleaved.
    fn parse_arith_expr(&mut self) -> Result<ParseNode> {
        let mut list = ParseNode::new(NodeLabel::ExpressionList);
        list.add_child(self.parse_term()?);
        while self.token_is(TokenKind::Operator, "+") || self.token_is(TokenKind::Operator, "-") {
            let op = self.consume()?;
            list.add_child(ParseNode::with_value(NodeLabel::BinaryOp, op.lexeme));
            list.add_child(self.parse_term()?);
        }
        if list.children.len() == 1 {
            Ok(list.children.remove(0))
        } else {
            Ok(list)
        }
    }

    fn parse_term(&mut self) -> Result<ParseNode> {
        let mut node = self.parse_factor()?;
        while self.token_is(TokenKind::Operator, "*")
            || self.token_is(TokenKind::Operator, "/")
            || self.token_is(TokenKind::Operator, "//")
        {
            let op = self.consume()?;
            let mut op_node = ParseNode::with_value(NodeLabel::BinaryOp, op.lexeme);
            op_node.add_child(node);
            op_node.add_child(self.parse_factor()?);
            node = op_node;
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<ParseNode> {
        if self.token_is(TokenKind::Operator, "+")
            || self.token_is(TokenKind::Operator, "-")
            || self.token_is(TokenKind::Operator, "~")
        {
            let op = self.consume()?;
            let mut node = ParseNode::with_value(NodeLabel::UnaryOp, op.lexeme);
            node.add_child(self.parse_factor()?);
            return Ok(node);
        }
        self.parse_atom_expr()
    }

    /// An atom followed by call and attribute trailers, chained left to
    /// right.
    fn parse_atom_expr(&mut self) -> Result<ParseNode> {
        let mut node = self.parse_atom()?;
        loop {
            if self.token_is(TokenKind::Delimiter, "(") {
                let mut call = ParseNode::new(NodeLabel::FunctionCall);
                call.add_child(node);
                call.add_child(self.delimiter_node()?);
                call.add_child(self.parse_call_arguments()?);
                let close = self.expect_token(
                    TokenKind::Delimiter,
                    ")",
                    "Expected ')' after function arguments",
                )?;
                call.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
                node = call;
            } else if self.token_is(TokenKind::Delimiter, ".") {
                let mut attr = ParseNode::new(NodeLabel::AttributeAccess);
                attr.add_child(node);
                attr.add_child(self.delimiter_node()?);
                let name =
                    self.expect_kind(TokenKind::Identifier, "Expected attribute name after '.'")?;
                attr.add_child(ParseNode::with_value(NodeLabel::Identifier, name.lexeme));
                node = attr;
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<ParseNode> {
        if self.token_is(TokenKind::Delimiter, "(") {
            return self.parse_paren_atom();
        }
        if self.token_is(TokenKind::Delimiter, "[") {
            return self.parse_list_atom();
        }
        if self.token_is(TokenKind::Delimiter, "{") {
            return self.parse_dict_atom();
        }
        if self.kind_is(TokenKind::Identifier) {
            let token = self.consume()?;
            return Ok(ParseNode::with_value(NodeLabel::Identifier, token.lexeme));
        }
        if self.kind_is(TokenKind::Literal) {
            let token = self.consume()?;
            return Ok(ParseNode::with_value(NodeLabel::Literal, token.lexeme));
        }
        if self.token_is(TokenKind::Keyword, "None")
            || self.token_is(TokenKind::Keyword, "True")
            || self.token_is(TokenKind::Keyword, "False")
        {
            let token = self.consume()?;
            return Ok(ParseNode::with_value(NodeLabel::Keyword, token.lexeme));
        }
        if self.at_end() {
            return Err(self.syntax_error("Unexpected end of input (EOF) while parsing expression"));
        }
        Err(self.syntax_error("Expected expression"))
    }

    /// `()` is an empty Tuple; `( test )` is a ParenExpr; one or more
    /// commas make a Tuple, trailing comma allowed.
    fn parse_paren_atom(&mut self) -> Result<ParseNode> {
        let open = self.consume()?;

        if self.token_is(TokenKind::Delimiter, ")") {
            let close = self.consume()?;
            let mut tuple = ParseNode::new(NodeLabel::Tuple);
            tuple.add_child(ParseNode::with_value(NodeLabel::Delimiter, open.lexeme));
            tuple.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
            return Ok(tuple);
        }

        let expr = self.parse_test()?;
        if self.token_is(TokenKind::Delimiter, ",") {
            let mut tuple = ParseNode::new(NodeLabel::Tuple);
            tuple.add_child(ParseNode::with_value(NodeLabel::Delimiter, open.lexeme));
            tuple.add_child(expr);
            while self.token_is(TokenKind::Delimiter, ",") {
                tuple.add_child(self.delimiter_node()?);
                if self.token_is(TokenKind::Delimiter, ")") {
                    break;
                }
                tuple.add_child(self.parse_test()?);
            }
            let close =
                self.expect_token(TokenKind::Delimiter, ")", "Expected ')' after tuple elements")?;
            tuple.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
            Ok(tuple)
        } else {
            let close =
                self.expect_token(TokenKind::Delimiter, ")", "Expected ')' after expression")?;
            let mut paren = ParseNode::new(NodeLabel::ParenExpr);
            paren.add_child(ParseNode::with_value(NodeLabel::Delimiter, open.lexeme));
            paren.add_child(expr);
            paren.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
            Ok(paren)
        }
    }

    fn parse_list_atom(&mut self) -> Result<ParseNode> {
        let mut list = ParseNode::new(NodeLabel::List);
        list.add_child(self.delimiter_node()?);
        if !self.token_is(TokenKind::Delimiter, "]") {
            list.add_child(self.parse_test()?);
            while self.token_is(TokenKind::Delimiter, ",") {
                list.add_child(self.delimiter_node()?);
                if self.token_is(TokenKind::Delimiter, "]") {
                    break;
                }
                list.add_child(self.parse_test()?);
            }
        }
        let close =
            self.expect_token(TokenKind::Delimiter, "]", "Expected ']' after list elements")?;
        list.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
        Ok(list)
    }

    fn parse_dict_atom(&mut self) -> Result<ParseNode> {
        let mut dict = ParseNode::new(NodeLabel::Dict);
        dict.add_child(self.delimiter_node()?);
        if !self.token_is(TokenKind::Delimiter, "}") {
            dict.add_child(self.parse_key_value_pair()?);
            while self.token_is(TokenKind::Delimiter, ",") {
                dict.add_child(self.delimiter_node()?);
                if self.token_is(TokenKind::Delimiter, "}") {
                    break;
                }
                dict.add_child(self.parse_key_value_pair()?);
            }
        }
        let close =
            self.expect_token(TokenKind::Delimiter, "}", "Expected '}' after dictionary elements")?;
        dict.add_child(ParseNode::with_value(NodeLabel::Delimiter, close.lexeme));
        Ok(dict)
    }

    fn parse_key_value_pair(&mut self) -> Result<ParseNode> {
        let mut pair = ParseNode::new(NodeLabel::KeyValuePair);
        pair.add_child(self.parse_test()?);
        let colon =
            self.expect_token(TokenKind::Delimiter, ":", "Expected ':' after dictionary key")?;
        pair.add_child(ParseNode::with_value(NodeLabel::Delimiter, colon.lexeme));
        pair.add_child(self.parse_test()?);
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, 1)
    }

    fn parse_source(source: &str) -> Result<ParseNode> {
        let out = lexer::tokenize(source).expect("tokenize should succeed");
        parse_tokens(out.tokens)
    }

    #[test]
    fn parses_simple_assignment() {
        let tree = parse_source("x = 5\n").expect("parse failed");
        assert_eq!(tree.label, NodeLabel::Program);
        assert_eq!(tree.children.len(), 1);

        let assign = &tree.children[0];
        assert_eq!(assign.label, NodeLabel::Assignment);
        let target = &assign.children[0];
        assert_eq!(target.label, NodeLabel::IdentifierList);
        assert_eq!(target.children[0].label, NodeLabel::Identifier);
        assert_eq!(target.children[0].value, "x");
        assert_eq!(assign.children[1].label, NodeLabel::AssignOp);
        assert_eq!(assign.children[1].value, "=");
        assert_eq!(assign.children[2].label, NodeLabel::Literal);
        assert_eq!(assign.children[2].value, "5");
    }

    #[test]
    fn parses_function_definition_with_delimiters() {
        let tree = parse_source("def add(a, b):\n    return a + b\n").expect("parse failed");
        let def = &tree.children[0];
        assert_eq!(def.label, NodeLabel::FunctionDefinition);

        let labels: Vec<NodeLabel> = def.children.iter().map(|child| child.label).collect();
        assert_eq!(
            labels,
            vec![
                NodeLabel::Keyword,
                NodeLabel::Identifier,
                NodeLabel::Delimiter,
                NodeLabel::Parameters,
                NodeLabel::Delimiter,
                NodeLabel::Delimiter,
                NodeLabel::Suite,
            ]
        );
        let params = &def.children[3];
        let param_dump: Vec<(&str, &str)> = params
            .children
            .iter()
            .map(|child| (child.label.name(), child.value.as_str()))
            .collect();
        assert_eq!(
            param_dump,
            vec![("Parameter", "a"), ("Delimiter", ","), ("Parameter", "b")]
        );

        let suite = &def.children[6];
        assert_eq!(suite.children.len(), 1);
        assert_eq!(suite.children[0].label, NodeLabel::ReturnStatement);
    }

    #[test]
    fn elif_and_else_attach_as_named_clauses() {
        let source = "if a == 1:\n    x = 2\nelif a == 2:\n    x = 3\nelse:\n    x = 4\n";
        let tree = parse_source(source).expect("parse failed");
        let if_node = &tree.children[0];
        assert_eq!(if_node.label, NodeLabel::IfStatement);
        let trailing: Vec<NodeLabel> = if_node
            .children
            .iter()
            .rev()
            .take(2)
            .rev()
            .map(|child| child.label)
            .collect();
        assert_eq!(trailing, vec![NodeLabel::ElifClause, NodeLabel::ElseClause]);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let tree = parse_source("r = a + b * c\n").expect("parse failed");
        let assign = &tree.children[0];
        let value = &assign.children[2];
        assert_eq!(value.label, NodeLabel::ExpressionList);
        assert_eq!(value.children.len(), 3);
        assert_eq!(value.children[0].value, "a");
        assert_eq!(value.children[1].label, NodeLabel::BinaryOp);
        assert_eq!(value.children[1].value, "+");
        assert!(value.children[1].children.is_empty());

        let product = &value.children[2];
        assert_eq!(product.label, NodeLabel::BinaryOp);
        assert_eq!(product.value, "*");
        assert_eq!(product.children[0].value, "b");
        assert_eq!(product.children[1].value, "c");
    }

    #[test]
    fn term_level_is_left_associative() {
        let tree = parse_source("r = a / b / c\n").expect("parse failed");
        let value = &tree.children[0].children[2];
        assert_eq!(value.label, NodeLabel::BinaryOp);
        assert_eq!(value.value, "/");
        assert_eq!(value.children[1].value, "c");

        let inner = &value.children[0];
        assert_eq!(inner.label, NodeLabel::BinaryOp);
        assert_eq!(inner.children[0].value, "a");
        assert_eq!(inner.children[1].value, "b");
    }

    #[test]
    fn ternary_has_exactly_three_operand_children() {
        let tree = parse_source("r = x if c else y\n").expect("parse failed");
        let value = &tree.children[0].children[2];
        assert_eq!(value.label, NodeLabel::TernaryOp);
        assert_eq!(value.children.len(), 3);
        let operands: Vec<(NodeLabel, &str)> = value
            .children
            .iter()
            .map(|child| (child.label, child.value.as_str()))
            .collect();
        assert_eq!(
            operands,
            vec![
                (NodeLabel::Identifier, "x"),
                (NodeLabel::Identifier, "c"),
                (NodeLabel::Identifier, "y"),
            ]
        );
    }

    #[test]
    fn comparisons_do_not_chain() {
        let err = parse_source("if a < b < c:\n    pass\n").expect_err("expected failure");
        let message = err.to_string();
        assert!(message.starts_with("Syntax Error at line 1 near '<'"), "{message}");
    }

    #[test]
    fn boolean_keywords_build_binary_ops() {
        let tree = parse_source("if a > 1 or b > 2 and not c > 3:\n    pass\n")
            .expect("parse failed");
        let condition = &tree.children[0].children[1];
        assert_eq!(condition.label, NodeLabel::BinaryOp);
        assert_eq!(condition.value, "or");
        let right = &condition.children[1];
        assert_eq!(right.label, NodeLabel::BinaryOp);
        assert_eq!(right.value, "and");
        assert_eq!(right.children[1].label, NodeLabel::UnaryOp);
        assert_eq!(right.children[1].value, "not");
    }

    #[test]
    fn call_statement_preserves_argument_delimiters() {
        let tree = parse_source("print(a, b)\n").expect("parse failed");
        let call = &tree.children[0];
        assert_eq!(call.label, NodeLabel::FunctionCallStatement);
        let labels: Vec<NodeLabel> = call.children.iter().map(|child| child.label).collect();
        assert_eq!(
            labels,
            vec![
                NodeLabel::Identifier,
                NodeLabel::Delimiter,
                NodeLabel::Arguments,
                NodeLabel::Delimiter,
            ]
        );
        let args = &call.children[2];
        let arg_dump: Vec<(&str, &str)> = args
            .children
            .iter()
            .map(|child| (child.label.name(), child.value.as_str()))
            .collect();
        assert_eq!(
            arg_dump,
            vec![("Identifier", "a"), ("Delimiter", ","), ("Identifier", "b")]
        );
    }

    #[test]
    fn attribute_chain_parses_as_trailers() {
        let tree = parse_source("car1.display()\n").expect("parse failed");
        let stmt = &tree.children[0];
        assert_eq!(stmt.label, NodeLabel::ExpressionStatement);
        let call = &stmt.children[0];
        assert_eq!(call.label, NodeLabel::FunctionCall);
        let attr = &call.children[0];
        assert_eq!(attr.label, NodeLabel::AttributeAccess);
        assert_eq!(attr.children[0].value, "car1");
        assert_eq!(attr.children[2].value, "display");
    }

    #[test]
    fn attribute_target_assignment() {
        let tree = parse_source("obj.name = value\n").expect("parse failed");
        let assign = &tree.children[0];
        assert_eq!(assign.label, NodeLabel::Assignment);
        let target = &assign.children[0];
        assert_eq!(target.children[0].label, NodeLabel::AttributeAccess);
    }

    #[test]
    fn augmented_assignment_operators_dispatch() {
        for op in ["+=", "-=", "*=", "/=", "%=", "//="] {
            let source = format!("x {op} 2\n");
            let tree = parse_source(&source).expect("parse failed");
            let assign = &tree.children[0];
            assert_eq!(assign.label, NodeLabel::Assignment);
            assert_eq!(assign.children[1].value, op);
        }
    }

    #[test]
    fn inline_suite_accepts_a_simple_statement() {
        let tree = parse_source("if a > 1: pass\n").expect("parse failed");
        let suite = tree.children[0]
            .children
            .iter()
            .find(|child| child.label == NodeLabel::Suite)
            .expect("suite present");
        assert_eq!(suite.children[0].label, NodeLabel::PassStatement);
    }

    #[test]
    fn class_definition_with_parent() {
        let tree = parse_source("class Car(Base):\n    pass\n").expect("parse failed");
        let class = &tree.children[0];
        assert_eq!(class.label, NodeLabel::ClassDefinition);
        let names: Vec<&str> = class
            .children
            .iter()
            .filter(|child| child.label == NodeLabel::Identifier)
            .map(|child| child.value.as_str())
            .collect();
        assert_eq!(names, vec!["Car", "Base"]);
    }

    #[test]
    fn import_forms() {
        let tree = parse_source("import os.path as p, sys\n").expect("parse failed");
        let import = &tree.children[0];
        assert_eq!(import.label, NodeLabel::ImportStatement);
        let labels: Vec<NodeLabel> = import.children.iter().map(|child| child.label).collect();
        assert_eq!(
            labels,
            vec![
                NodeLabel::Keyword,
                NodeLabel::DottedName,
                NodeLabel::Alias,
                NodeLabel::DottedName,
            ]
        );

        let tree = parse_source("from os import *\n").expect("parse failed");
        let import = &tree.children[0];
        let labels: Vec<NodeLabel> = import.children.iter().map(|child| child.label).collect();
        assert_eq!(
            labels,
            vec![NodeLabel::Keyword, NodeLabel::DottedName, NodeLabel::ImportAll]
        );
    }

    #[test]
    fn for_loop_over_range() {
        let tree = parse_source("for i in range(5):\n    x = i\n").expect("parse failed");
        let for_node = &tree.children[0];
        assert_eq!(for_node.label, NodeLabel::ForStatement);
        assert_eq!(for_node.children[1].value, "i");
        assert_eq!(for_node.children[2].value, "in");
        assert_eq!(for_node.children[3].label, NodeLabel::FunctionCall);
    }

    #[test]
    fn bare_return_has_no_value() {
        let tree = parse_source("def f():\n    return\n").expect("parse failed");
        let suite = &tree.children[0].children[6];
        let ret = &suite.children[0];
        assert_eq!(ret.label, NodeLabel::ReturnStatement);
        assert_eq!(ret.children.len(), 1);
    }

    #[test]
    fn paren_and_tuple_atoms_disambiguate() {
        let paren = parse_source("if (a):\n    pass\n").expect("parse failed");
        let condition = &paren.children[0].children[1];
        assert_eq!(condition.label, NodeLabel::ParenExpr);
        assert_eq!(condition.children.len(), 3);

        let tuple = parse_source("if (a, b):\n    pass\n").expect("parse failed");
        let condition = &tuple.children[0].children[1];
        assert_eq!(condition.label, NodeLabel::Tuple);
        let dump: Vec<(&str, &str)> = condition
            .children
            .iter()
            .map(|child| (child.label.name(), child.value.as_str()))
            .collect();
        assert_eq!(
            dump,
            vec![
                ("Delimiter", "("),
                ("Identifier", "a"),
                ("Delimiter", ","),
                ("Identifier", "b"),
                ("Delimiter", ")"),
            ]
        );
    }

    #[test]
    fn empty_tuple_atom() {
        let tokens = vec![
            tok(TokenKind::Identifier, "x"),
            tok(TokenKind::Operator, "="),
            tok(TokenKind::Delimiter, "("),
            tok(TokenKind::Delimiter, ")"),
            tok(TokenKind::Newline, "\n"),
        ];
        let tree = parse_tokens(tokens).expect("parse failed");
        let value = &tree.children[0].children[2];
        assert_eq!(value.label, NodeLabel::Tuple);
        assert_eq!(value.children.len(), 2);
    }

    #[test]
    fn dict_atom_owns_colons_inside_pairs() {
        let tokens = vec![
            tok(TokenKind::Identifier, "d"),
            tok(TokenKind::Operator, "="),
            tok(TokenKind::Delimiter, "{"),
            tok(TokenKind::Literal, "\"a\""),
            tok(TokenKind::Delimiter, ":"),
            tok(TokenKind::Literal, "1"),
            tok(TokenKind::Delimiter, ","),
            tok(TokenKind::Literal, "\"b\""),
            tok(TokenKind::Delimiter, ":"),
            tok(TokenKind::Literal, "2"),
            tok(TokenKind::Delimiter, "}"),
            tok(TokenKind::Newline, "\n"),
        ];
        let tree = parse_tokens(tokens).expect("parse failed");
        let dict = &tree.children[0].children[2];
        assert_eq!(dict.label, NodeLabel::Dict);
        let labels: Vec<NodeLabel> = dict.children.iter().map(|child| child.label).collect();
        assert_eq!(
            labels,
            vec![
                NodeLabel::Delimiter,
                NodeLabel::KeyValuePair,
                NodeLabel::Delimiter,
                NodeLabel::KeyValuePair,
                NodeLabel::Delimiter,
            ]
        );
        let pair = &dict.children[1];
        assert_eq!(pair.children[1].label, NodeLabel::Delimiter);
        assert_eq!(pair.children[1].value, ":");
    }

    #[test]
    fn end_of_input_terminates_a_block() {
        let tokens = vec![
            tok(TokenKind::Keyword, "if"),
            tok(TokenKind::Keyword, "True"),
            tok(TokenKind::Delimiter, ":"),
            tok(TokenKind::Newline, "\n"),
            tok(TokenKind::Indent, "4"),
            tok(TokenKind::Keyword, "pass"),
        ];
        let tree = parse_tokens(tokens).expect("parse failed");
        assert_eq!(tree.children[0].label, NodeLabel::IfStatement);
    }

    #[test]
    fn missing_colon_after_def_reports_line_and_near_token() {
        let err = parse_source("def f()\n    pass\n").expect_err("expected failure");
        let message = err.to_string();
        assert!(message.contains("Expected ':' after function declaration"), "{message}");
        assert!(message.starts_with("Syntax Error at line 1"), "{message}");
    }

    #[test]
    fn missing_operand_reports_expected_expression() {
        let err = parse_source("x = 1 +\n").expect_err("expected failure");
        let message = err.to_string();
        assert!(message.contains("Expected expression"), "{message}");
    }

    #[test]
    fn trailing_comma_in_call_is_tolerated() {
        let tree = parse_source("print(a, b,)\n").expect("parse failed");
        let args = &tree.children[0].children[2];
        let idents = args
            .children
            .iter()
            .filter(|child| child.label == NodeLabel::Identifier)
            .count();
        assert_eq!(idents, 2);
    }
}
