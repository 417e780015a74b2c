//! SHACL (Shapes Constraint Language) conformance checking
//!
//! The default [`ConformanceChecker`](crate::rdf::ConformanceChecker). It covers
//! the SHACL Core constraints that shape files use in practice and reads class
//! hierarchies from the ontology, so `sh:targetClass ex:Animal` also selects
//! instances of `ex:Dog` when the ontology says `ex:Dog rdfs:subClassOf ex:Animal`.
//!
//! # Components
//!
//! - **ShapeDiscovery**: reads node and property shapes out of the shapes graph
//! - **ClassHierarchy**: `rdfs:subClassOf` closure over ontology, shapes and data
//! - **ConstraintChecker**: evaluates one shape's constraints for one focus node
//! - **ShaclChecker**: ties the above together and applies the [`WarningPolicy`]

use crate::error::Result;
use crate::rdf::report::{Severity, ValidationReport, ValidationResult, WarningPolicy};
use crate::rdf::vocab::{owl, sh};
use crate::rdf::{Conformance, ConformanceChecker};
use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::{
    Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef,
};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet, VecDeque};

// =============================================================================
// Checker
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ShaclChecker {
    warning_policy: WarningPolicy,
}

impl ShaclChecker {
    pub fn new(warning_policy: WarningPolicy) -> Self {
        Self { warning_policy }
    }

    pub fn warning_policy(&self) -> WarningPolicy {
        self.warning_policy
    }

    /// Evaluate every active shape and collect the results.
    pub fn validate(&self, data: &Graph, ontology: &Graph, shapes: &Graph) -> ValidationReport {
        let hierarchy = ClassHierarchy::from_graphs(&[ontology, shapes, data]);
        let checker = ConstraintChecker::new(data, &hierarchy);
        let mut report = ValidationReport::new();

        for shape in ShapeDiscovery::new(shapes).node_shapes() {
            if shape.deactivated {
                continue;
            }
            for focus in shape.focus_nodes(data, &hierarchy) {
                for result in checker.check_node_shape(&focus, &shape) {
                    report.add_result(result);
                }
            }
        }

        report
    }
}

impl ConformanceChecker for ShaclChecker {
    type Report = Graph;

    fn check(&self, data: &Graph, ontology: &Graph, shapes: &Graph) -> Result<Conformance<Graph>> {
        let report = self.validate(data, ontology, shapes);
        let conforms = report.conforms(self.warning_policy);
        tracing::debug!(
            conforms,
            results = report.results().len(),
            policy = ?self.warning_policy,
            "SHACL evaluation finished"
        );

        Ok(Conformance {
            conforms,
            results_graph: report.to_graph(self.warning_policy),
            extra: Some(report.summary()),
        })
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Constraints {
    min_count: Option<usize>,
    max_count: Option<usize>,
    datatype: Option<NamedNode>,
    classes: Vec<NamedNode>,
    node_kind: Option<NamedNode>,
    pattern: Option<Regex>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min_inclusive: Option<Literal>,
    max_inclusive: Option<Literal>,
    min_exclusive: Option<Literal>,
    max_exclusive: Option<Literal>,
    in_values: Option<Vec<Term>>,
    has_values: Vec<Term>,
    unique_lang: bool,
}

#[derive(Debug, Clone)]
struct PropertyShape {
    id: NamedOrBlankNode,
    path: NamedNode,
    constraints: Constraints,
    severity: Option<Severity>,
    message: Option<String>,
    deactivated: bool,
}

#[derive(Debug, Clone)]
struct NodeShape {
    id: NamedOrBlankNode,
    target_classes: Vec<NamedNode>,
    target_nodes: Vec<Term>,
    target_subjects_of: Vec<NamedNode>,
    target_objects_of: Vec<NamedNode>,
    constraints: Constraints,
    properties: Vec<PropertyShape>,
    severity: Severity,
    message: Option<String>,
    deactivated: bool,
}

impl NodeShape {
    /// Focus nodes selected by the shape's targets, in discovery order without duplicates.
    fn focus_nodes(&self, data: &Graph, hierarchy: &ClassHierarchy) -> Vec<Term> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        let mut push = |term: Term| {
            if seen.insert(term.clone()) {
                nodes.push(term);
            }
        };

        for node in &self.target_nodes {
            push(node.clone());
        }
        for class in &self.target_classes {
            for instance in hierarchy.instances_of(data, class) {
                push(instance);
            }
        }
        for predicate in &self.target_subjects_of {
            for triple in data.triples_for_predicate(predicate) {
                push(triple.subject.into_owned().into());
            }
        }
        for predicate in &self.target_objects_of {
            for triple in data.triples_for_predicate(predicate) {
                push(triple.object.into_owned());
            }
        }

        nodes
    }
}

// =============================================================================
// Shape Discovery
// =============================================================================

struct ShapeDiscovery<'a> {
    shapes: &'a Graph,
}

impl<'a> ShapeDiscovery<'a> {
    fn new(shapes: &'a Graph) -> Self {
        Self { shapes }
    }

    /// Every targeted shape: explicit `sh:NodeShape`s plus anything carrying a
    /// target, including top-level `sh:PropertyShape`s.
    fn node_shapes(&self) -> Vec<NodeShape> {
        let target_predicates = [
            sh("targetClass"),
            sh("targetNode"),
            sh("targetSubjectsOf"),
            sh("targetObjectsOf"),
        ];

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let node_shape = sh("NodeShape");
        for id in self.shapes.subjects_for_predicate_object(rdf::TYPE, node_shape.as_ref()) {
            if seen.insert(id.into_owned()) {
                ids.push(id.into_owned());
            }
        }
        for predicate in &target_predicates {
            for triple in self.shapes.triples_for_predicate(predicate) {
                let id = triple.subject.into_owned();
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        ids.into_iter().map(|id| self.load_node_shape(id)).collect()
    }

    fn load_node_shape(&self, id: NamedOrBlankNode) -> NodeShape {
        let subject = id.as_ref();
        let mut target_classes = self.named_nodes(subject, &sh("targetClass"));

        // Implicit class target: a shape that is itself a class targets its instances
        if let NamedOrBlankNode::NamedNode(class) = &id {
            if self.is_class(subject) && !target_classes.contains(class) {
                target_classes.push(class.clone());
            }
        }

        // A targeted shape with its own sh:path is a property shape: its
        // constraints apply to the path values, not to the focus node
        let (constraints, properties) = if self.object(subject, &sh("path")).is_some() {
            let own = self.load_property_shape(id.clone());
            (Constraints::default(), own.into_iter().collect())
        } else {
            let properties = self
                .objects(subject, &sh("property"))
                .into_iter()
                .filter_map(into_subject)
                .filter_map(|prop_id| self.load_property_shape(prop_id))
                .collect();
            (self.load_constraints(subject), properties)
        };

        NodeShape {
            target_classes,
            target_nodes: self.objects(subject, &sh("targetNode")),
            target_subjects_of: self.named_nodes(subject, &sh("targetSubjectsOf")),
            target_objects_of: self.named_nodes(subject, &sh("targetObjectsOf")),
            constraints,
            properties,
            severity: self.severity(subject).unwrap_or(Severity::Violation),
            message: self.string(subject, &sh("message")),
            deactivated: self.boolean(subject, &sh("deactivated")),
            id,
        }
    }

    fn load_property_shape(&self, id: NamedOrBlankNode) -> Option<PropertyShape> {
        let subject = id.as_ref();
        // Only predicate paths are supported
        let path = match self.object(subject, &sh("path")) {
            Some(Term::NamedNode(path)) => path,
            other => {
                tracing::warn!(
                    shape = %id,
                    path = ?other,
                    "skipping property shape without a predicate path"
                );
                return None;
            }
        };

        Some(PropertyShape {
            path,
            constraints: self.load_constraints(subject),
            severity: self.severity(subject),
            message: self.string(subject, &sh("message")),
            deactivated: self.boolean(subject, &sh("deactivated")),
            id,
        })
    }

    fn load_constraints(&self, subject: NamedOrBlankNodeRef<'_>) -> Constraints {
        Constraints {
            min_count: self.count(subject, &sh("minCount")),
            max_count: self.count(subject, &sh("maxCount")),
            datatype: self.named_node(subject, &sh("datatype")),
            classes: self.named_nodes(subject, &sh("class")),
            node_kind: self.named_node(subject, &sh("nodeKind")),
            pattern: self.pattern(subject),
            min_length: self.count(subject, &sh("minLength")),
            max_length: self.count(subject, &sh("maxLength")),
            min_inclusive: self.literal(subject, &sh("minInclusive")),
            max_inclusive: self.literal(subject, &sh("maxInclusive")),
            min_exclusive: self.literal(subject, &sh("minExclusive")),
            max_exclusive: self.literal(subject, &sh("maxExclusive")),
            in_values: self.object(subject, &sh("in")).map(|head| self.rdf_list(head)),
            has_values: self.objects(subject, &sh("hasValue")),
            unique_lang: self.boolean(subject, &sh("uniqueLang")),
        }
    }

    fn is_class(&self, subject: NamedOrBlankNodeRef<'_>) -> bool {
        let owl_class = owl("Class");
        self.shapes
            .objects_for_subject_predicate(subject, rdf::TYPE)
            .any(|class| {
                class == TermRef::from(rdfs::CLASS) || class == TermRef::from(owl_class.as_ref())
            })
    }

    fn severity(&self, subject: NamedOrBlankNodeRef<'_>) -> Option<Severity> {
        self.named_node(subject, &sh("severity"))
            .map(|iri| Severity::from_iri(iri.as_str()))
    }

    fn pattern(&self, subject: NamedOrBlankNodeRef<'_>) -> Option<Regex> {
        let pattern = self.string(subject, &sh("pattern"))?;
        let flags = self.string(subject, &sh("flags")).unwrap_or_default();

        let mut builder = RegexBuilder::new(&pattern);
        builder
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'));

        match builder.build() {
            Ok(regex) => Some(regex),
            Err(error) => {
                tracing::warn!(
                    shape = %subject,
                    pattern = %pattern,
                    %error,
                    "ignoring invalid sh:pattern"
                );
                None
            }
        }
    }

    fn object(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> Option<Term> {
        self.shapes
            .object_for_subject_predicate(subject, predicate)
            .map(TermRef::into_owned)
    }

    fn objects(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> Vec<Term> {
        self.shapes
            .objects_for_subject_predicate(subject, predicate)
            .map(TermRef::into_owned)
            .collect()
    }

    fn named_node(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: &NamedNode,
    ) -> Option<NamedNode> {
        match self.object(subject, predicate)? {
            Term::NamedNode(node) => Some(node),
            _ => None,
        }
    }

    fn named_nodes(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: &NamedNode,
    ) -> Vec<NamedNode> {
        self.objects(subject, predicate)
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(node) => Some(node),
                _ => None,
            })
            .collect()
    }

    fn literal(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> Option<Literal> {
        match self.object(subject, predicate)? {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    fn string(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> Option<String> {
        self.literal(subject, predicate)
            .map(|literal| literal.value().to_string())
    }

    fn count(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> Option<usize> {
        let value = self.string(subject, predicate)?;
        match value.trim().parse::<usize>() {
            Ok(count) => Some(count),
            Err(_) => {
                tracing::warn!(
                    shape = %subject,
                    predicate = %predicate,
                    value = %value,
                    "ignoring non-integer constraint value"
                );
                None
            }
        }
    }

    fn boolean(&self, subject: NamedOrBlankNodeRef<'_>, predicate: &NamedNode) -> bool {
        matches!(self.string(subject, predicate).as_deref(), Some("true" | "1"))
    }

    fn rdf_list(&self, head: Term) -> Vec<Term> {
        let mut values = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head;

        while let Some(node) = into_subject(current) {
            if node.as_ref() == NamedOrBlankNodeRef::from(rdf::NIL)
                || !visited.insert(node.clone())
            {
                break;
            }
            if let Some(first) = self.object(node.as_ref(), &rdf::FIRST.into_owned()) {
                values.push(first);
            }
            match self.object(node.as_ref(), &rdf::REST.into_owned()) {
                Some(rest) => current = rest,
                None => break,
            }
        }

        values
    }
}

fn into_subject(term: Term) -> Option<NamedOrBlankNode> {
    match term {
        Term::NamedNode(node) => Some(node.into()),
        Term::BlankNode(node) => Some(node.into()),
        _ => None,
    }
}

fn as_subject(term: &Term) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        _ => None,
    }
}

// =============================================================================
// Class Hierarchy
// =============================================================================

/// `rdfs:subClassOf` edges gathered from several graphs.
#[derive(Debug, Default)]
pub struct ClassHierarchy {
    parents: HashMap<Term, Vec<Term>>,
}

impl ClassHierarchy {
    pub fn from_graphs(graphs: &[&Graph]) -> Self {
        let mut parents: HashMap<Term, Vec<Term>> = HashMap::new();
        for graph in graphs {
            for triple in graph.triples_for_predicate(rdfs::SUB_CLASS_OF) {
                let child = Term::from(triple.subject.into_owned());
                let parent = triple.object.into_owned();
                let entry = parents.entry(child).or_default();
                if !entry.contains(&parent) {
                    entry.push(parent);
                }
            }
        }
        Self { parents }
    }

    /// Whether `class` equals `ancestor` or reaches it through `rdfs:subClassOf`.
    pub fn is_subclass_of(&self, class: &Term, ancestor: &Term) -> bool {
        let mut queue = VecDeque::from([class.clone()]);
        let mut visited = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if &current == ancestor {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&current) {
                queue.extend(parents.iter().cloned());
            }
        }

        false
    }

    /// SHACL instance check: some `rdf:type` of `node` in `data` is a subclass of `class`.
    pub fn is_instance_of(&self, data: &Graph, node: &Term, class: &NamedNode) -> bool {
        let Some(subject) = as_subject(node) else {
            return false;
        };
        let class = Term::from(class.clone());
        data.objects_for_subject_predicate(subject, rdf::TYPE)
            .any(|ty| self.is_subclass_of(&ty.into_owned(), &class))
    }

    pub fn instances_of(&self, data: &Graph, class: &NamedNode) -> Vec<Term> {
        let class = Term::from(class.clone());
        let mut seen = HashSet::new();
        data.triples_for_predicate(rdf::TYPE)
            .filter(|triple| self.is_subclass_of(&triple.object.into_owned(), &class))
            .map(|triple| Term::from(triple.subject.into_owned()))
            .filter(|node| seen.insert(node.clone()))
            .collect()
    }
}

// =============================================================================
// Constraint Checker
// =============================================================================

struct ConstraintChecker<'a> {
    data: &'a Graph,
    hierarchy: &'a ClassHierarchy,
}

/// Where a result comes from: the shape and the defaults it contributes.
struct Source<'s> {
    shape: &'s NamedOrBlankNode,
    path: Option<&'s NamedNode>,
    severity: Severity,
    message: Option<&'s str>,
}

impl Source<'_> {
    fn result(
        &self,
        focus: &Term,
        component: &'static str,
        default_message: String,
    ) -> ValidationResult {
        let message = self
            .message
            .map(str::to_string)
            .unwrap_or(default_message);
        let result = ValidationResult::new(
            focus.clone(),
            message,
            self.severity,
            self.shape.clone(),
            component,
        );
        match self.path {
            Some(path) => result.with_path(path.clone()),
            None => result,
        }
    }
}

impl<'a> ConstraintChecker<'a> {
    fn new(data: &'a Graph, hierarchy: &'a ClassHierarchy) -> Self {
        Self { data, hierarchy }
    }

    fn check_node_shape(&self, focus: &Term, shape: &NodeShape) -> Vec<ValidationResult> {
        let source = Source {
            shape: &shape.id,
            path: None,
            severity: shape.severity,
            message: shape.message.as_deref(),
        };
        let mut results = self.check_values(
            focus,
            std::slice::from_ref(focus),
            &shape.constraints,
            &source,
        );

        for property in &shape.properties {
            if property.deactivated {
                continue;
            }
            let source = Source {
                shape: &property.id,
                path: Some(&property.path),
                severity: property.severity.unwrap_or(shape.severity),
                message: property.message.as_deref().or(shape.message.as_deref()),
            };
            let values = self.property_values(focus, &property.path);
            results.extend(self.check_values(focus, &values, &property.constraints, &source));
        }

        results
    }

    fn property_values(&self, focus: &Term, path: &NamedNode) -> Vec<Term> {
        match as_subject(focus) {
            Some(subject) => self
                .data
                .objects_for_subject_predicate(subject, path)
                .map(TermRef::into_owned)
                .collect(),
            None => Vec::new(),
        }
    }

    fn check_values(
        &self,
        focus: &Term,
        values: &[Term],
        constraints: &Constraints,
        source: &Source<'_>,
    ) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        if let Some(min) = constraints.min_count {
            if values.len() < min {
                results.push(source.result(
                    focus,
                    "MinCountConstraintComponent",
                    format!("Less than {min} values on {}", describe_path(source)),
                ));
            }
        }
        if let Some(max) = constraints.max_count {
            if values.len() > max {
                results.push(source.result(
                    focus,
                    "MaxCountConstraintComponent",
                    format!("More than {max} values on {}", describe_path(source)),
                ));
            }
        }

        for value in values {
            results.extend(self.check_value(focus, value, constraints, source));
        }

        for expected in &constraints.has_values {
            if !values.contains(expected) {
                results.push(source.result(
                    focus,
                    "HasValueConstraintComponent",
                    format!("Missing expected value {expected}"),
                ));
            }
        }

        if constraints.unique_lang {
            let mut seen = HashSet::new();
            let mut reported = HashSet::new();
            for value in values {
                if let Term::Literal(literal) = value {
                    if let Some(lang) = literal.language() {
                        if !seen.insert(lang) && reported.insert(lang) {
                            results.push(source.result(
                                focus,
                                "UniqueLangConstraintComponent",
                                format!("Language \"{lang}\" used more than once"),
                            ));
                        }
                    }
                }
            }
        }

        results
    }

    fn check_value(
        &self,
        focus: &Term,
        value: &Term,
        constraints: &Constraints,
        source: &Source<'_>,
    ) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        let mut fail = |component: &'static str, message: String| {
            results.push(source.result(focus, component, message).with_value(value.clone()));
        };

        if let Some(datatype) = &constraints.datatype {
            let matches = matches!(
                value,
                Term::Literal(literal) if literal.datatype() == datatype.as_ref()
            );
            if !matches {
                fail(
                    "DatatypeConstraintComponent",
                    format!("Value does not have datatype {datatype}"),
                );
            }
        }

        for class in &constraints.classes {
            if !self.hierarchy.is_instance_of(self.data, value, class) {
                fail(
                    "ClassConstraintComponent",
                    format!("Value does not have class {class}"),
                );
            }
        }

        if let Some(kind) = &constraints.node_kind {
            if !node_kind_matches(kind.as_ref(), value) {
                fail(
                    "NodeKindConstraintComponent",
                    format!("Value does not have node kind {kind}"),
                );
            }
        }

        let text = lexical_form(value);

        if let Some(min) = constraints.min_length {
            if text.is_none_or(|s| s.chars().count() < min) {
                fail(
                    "MinLengthConstraintComponent",
                    format!("Value has less than {min} characters"),
                );
            }
        }
        if let Some(max) = constraints.max_length {
            if text.is_none_or(|s| s.chars().count() > max) {
                fail(
                    "MaxLengthConstraintComponent",
                    format!("Value has more than {max} characters"),
                );
            }
        }
        if let Some(pattern) = &constraints.pattern {
            if text.is_none_or(|s| !pattern.is_match(s)) {
                fail(
                    "PatternConstraintComponent",
                    format!("Value does not match pattern \"{}\"", pattern.as_str()),
                );
            }
        }

        let ranges = [
            (&constraints.min_inclusive, ">=", RangeCheck::MinInclusive),
            (&constraints.max_inclusive, "<=", RangeCheck::MaxInclusive),
            (&constraints.min_exclusive, ">", RangeCheck::MinExclusive),
            (&constraints.max_exclusive, "<", RangeCheck::MaxExclusive),
        ];
        for (bound, op, check) in ranges {
            let component = check.component();
            if let Some(bound) = bound {
                if !check.holds(value, bound) {
                    fail(component, format!("Value is not {op} {}", bound.value()));
                }
            }
        }

        if let Some(allowed) = &constraints.in_values {
            if !allowed.contains(value) {
                let allowed = allowed.iter().map(Term::to_string).collect::<Vec<_>>();
                fail(
                    "InConstraintComponent",
                    format!("Value is not in {}", allowed.join(", ")),
                );
            }
        }

        results
    }
}

fn describe_path(source: &Source<'_>) -> String {
    match source.path {
        Some(path) => path.to_string(),
        None => "focus node".to_string(),
    }
}

fn lexical_form(value: &Term) -> Option<&str> {
    match value {
        Term::NamedNode(node) => Some(node.as_str()),
        Term::Literal(literal) => Some(literal.value()),
        _ => None,
    }
}

fn node_kind_matches(kind: NamedNodeRef<'_>, value: &Term) -> bool {
    let (iri, blank, literal) = match value {
        Term::NamedNode(_) => (true, false, false),
        Term::BlankNode(_) => (false, true, false),
        Term::Literal(_) => (false, false, true),
        #[allow(unreachable_patterns)]
        _ => (false, false, false),
    };
    match kind.as_str().strip_prefix(crate::rdf::vocab::SH_NS) {
        Some("IRI") => iri,
        Some("BlankNode") => blank,
        Some("Literal") => literal,
        Some("BlankNodeOrIRI") => blank || iri,
        Some("BlankNodeOrLiteral") => blank || literal,
        Some("IRIOrLiteral") => iri || literal,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
enum RangeCheck {
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
}

impl RangeCheck {
    fn component(self) -> &'static str {
        match self {
            RangeCheck::MinInclusive => "MinInclusiveConstraintComponent",
            RangeCheck::MaxInclusive => "MaxInclusiveConstraintComponent",
            RangeCheck::MinExclusive => "MinExclusiveConstraintComponent",
            RangeCheck::MaxExclusive => "MaxExclusiveConstraintComponent",
        }
    }

    /// Values that cannot be compared with the bound fail the check.
    fn holds(self, value: &Term, bound: &Literal) -> bool {
        let Term::Literal(value) = value else {
            return false;
        };
        let Some(ordering) = compare_literals(value, bound) else {
            return false;
        };
        match self {
            RangeCheck::MinInclusive => ordering.is_ge(),
            RangeCheck::MaxInclusive => ordering.is_le(),
            RangeCheck::MinExclusive => ordering.is_gt(),
            RangeCheck::MaxExclusive => ordering.is_lt(),
        }
    }
}

fn compare_literals(value: &Literal, bound: &Literal) -> Option<std::cmp::Ordering> {
    if is_numeric(value.datatype()) && is_numeric(bound.datatype()) {
        let left = value.value().trim().parse::<f64>().ok()?;
        let right = bound.value().trim().parse::<f64>().ok()?;
        return left.partial_cmp(&right);
    }
    // Dates, times and strings of the same datatype compare lexically
    if value.datatype() == bound.datatype() {
        return Some(value.value().cmp(bound.value()));
    }
    None
}

fn is_numeric(datatype: NamedNodeRef<'_>) -> bool {
    [
        xsd::INTEGER,
        xsd::DECIMAL,
        xsd::DOUBLE,
        xsd::FLOAT,
        xsd::INT,
        xsd::LONG,
        xsd::SHORT,
        xsd::BYTE,
        xsd::NON_NEGATIVE_INTEGER,
        xsd::POSITIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::NEGATIVE_INTEGER,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_LONG,
        xsd::UNSIGNED_SHORT,
        xsd::UNSIGNED_BYTE,
    ]
    .contains(&datatype)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::loader::parse_turtle;

    const PREFIXES: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
    "#;

    fn graph(body: &str) -> Graph {
        parse_turtle(&format!("{PREFIXES}{body}")).unwrap()
    }

    fn validate(data: &str, shapes: &str) -> ValidationReport {
        ShaclChecker::default().validate(&graph(data), &Graph::new(), &graph(shapes))
    }

    /// Constraint component local names, sorted; property shapes are blank
    /// nodes so their evaluation order is not stable.
    fn components(report: &ValidationReport) -> Vec<String> {
        let mut names: Vec<String> = report
            .results()
            .iter()
            .map(|r| {
                r.source_constraint_component()
                    .as_str()
                    .trim_start_matches(crate::rdf::vocab::SH_NS)
                    .to_string()
            })
            .collect();
        names.sort();
        names
    }

    const PERSON_SHAPE: &str = r#"
        ex:PersonShape a sh:NodeShape ;
            sh:targetClass ex:Person ;
            sh:property [
                sh:path ex:name ;
                sh:minCount 1 ;
                sh:maxCount 1 ;
                sh:datatype xsd:string ;
            ] ;
            sh:property [
                sh:path ex:age ;
                sh:datatype xsd:integer ;
                sh:minInclusive 0 ;
                sh:maxExclusive 150 ;
            ] .
    "#;

    #[test]
    fn test_conforming_data() {
        let report = validate(
            r#"ex:alice a ex:Person ; ex:name "Alice" ; ex:age 30 ."#,
            PERSON_SHAPE,
        );
        assert!(report.conforms(WarningPolicy::Tolerate), "{:?}", report.results());
    }

    #[test]
    fn test_cardinality_and_range_violations() {
        let report = validate(
            r#"ex:bob a ex:Person ; ex:age 200 ."#,
            PERSON_SHAPE,
        );
        assert!(!report.conforms(WarningPolicy::Tolerate));
        assert_eq!(
            components(&report),
            vec!["MaxExclusiveConstraintComponent", "MinCountConstraintComponent"]
        );
        let min_count = report
            .results()
            .iter()
            .find(|r| r.source_constraint_component() == sh("MinCountConstraintComponent"))
            .unwrap();
        assert_eq!(min_count.focus_node().to_string(), "<http://example.org/bob>");
        assert_eq!(
            min_count.result_path().map(|p| p.as_str()),
            Some("http://example.org/name")
        );
    }

    #[test]
    fn test_datatype_violation_reports_value() {
        let report = validate(
            r#"ex:carol a ex:Person ; ex:name "Carol" ; ex:age "old" ."#,
            PERSON_SHAPE,
        );
        let datatype = report
            .results()
            .iter()
            .find(|r| r.source_constraint_component() == sh("DatatypeConstraintComponent"))
            .expect("datatype violation");
        assert_eq!(datatype.value().unwrap().to_string(), "\"old\"");
    }

    #[test]
    fn test_target_class_follows_ontology_subclasses() {
        let data = graph(r#"ex:rex a ex:Dog ."#);
        let ontology = graph(
            r#"ex:Dog rdfs:subClassOf ex:Mammal . ex:Mammal rdfs:subClassOf ex:Animal ."#,
        );
        let shapes = graph(
            r#"ex:AnimalShape a sh:NodeShape ; sh:targetClass ex:Animal ;
                sh:property [ sh:path ex:name ; sh:minCount 1 ] ."#,
        );

        let checker = ShaclChecker::default();
        let with_ontology = checker.validate(&data, &ontology, &shapes);
        assert_eq!(with_ontology.violation_count(), 1);

        let without_ontology = checker.validate(&data, &Graph::new(), &shapes);
        assert_eq!(without_ontology.violation_count(), 0);
    }

    #[test]
    fn test_class_constraint_uses_hierarchy() {
        let data = graph(
            r#"ex:alice ex:owns ex:rex, ex:rock . ex:rex a ex:Dog . ex:rock a ex:Mineral ."#,
        );
        let ontology = graph(r#"ex:Dog rdfs:subClassOf ex:Pet ."#);
        let shapes = graph(
            r#"ex:OwnerShape sh:targetSubjectsOf ex:owns ;
                sh:property [ sh:path ex:owns ; sh:class ex:Pet ] ."#,
        );

        let report = ShaclChecker::default().validate(&data, &ontology, &shapes);
        assert_eq!(report.violation_count(), 1);
        assert_eq!(
            report.results()[0].value().unwrap().to_string(),
            "<http://example.org/rock>"
        );
    }

    #[test]
    fn test_string_constraints() {
        let shapes = r#"
            ex:CodeShape sh:targetSubjectsOf ex:code ;
                sh:property [
                    sh:path ex:code ;
                    sh:pattern "^[a-z]+$" ;
                    sh:flags "i" ;
                    sh:minLength 2 ;
                    sh:maxLength 4 ;
                ] .
        "#;
        assert!(validate(r#"ex:a ex:code "AbC" ."#, shapes).conforms(WarningPolicy::Tolerate));

        let report = validate(r#"ex:a ex:code "x1" . ex:b ex:code "abcdef" ."#, shapes);
        assert_eq!(
            components(&report),
            vec!["MaxLengthConstraintComponent", "PatternConstraintComponent"]
        );
    }

    #[test]
    fn test_in_has_value_and_node_kind() {
        let shapes = r#"
            ex:StatusShape sh:targetNode ex:task ;
                sh:nodeKind sh:IRI ;
                sh:property [ sh:path ex:status ; sh:in ( "open" "closed" ) ] ;
                sh:property [ sh:path ex:owner ; sh:hasValue ex:alice ; sh:nodeKind sh:IRI ] .
        "#;
        let ok = validate(r#"ex:task ex:status "open" ; ex:owner ex:alice ."#, shapes);
        assert!(ok.conforms(WarningPolicy::Tolerate), "{:?}", ok.results());

        let report = validate(r#"ex:task ex:status "pending" ; ex:owner "bob" ."#, shapes);
        assert_eq!(
            components(&report),
            vec![
                "HasValueConstraintComponent",
                "InConstraintComponent",
                "NodeKindConstraintComponent",
            ]
        );
    }

    #[test]
    fn test_unique_lang() {
        let shapes = r#"
            ex:LabelShape sh:targetSubjectsOf rdfs:label ;
                sh:property [ sh:path rdfs:label ; sh:uniqueLang true ] .
        "#;
        let report = validate(
            r#"ex:a rdfs:label "colour"@en, "color"@en, "couleur"@fr ."#,
            shapes,
        );
        assert_eq!(components(&report), vec!["UniqueLangConstraintComponent"]);
    }

    #[test]
    fn test_severity_and_policy() {
        let shapes = r#"
            ex:SoftShape sh:targetClass ex:Person ;
                sh:severity sh:Warning ;
                sh:message "people should have an email" ;
                sh:property [ sh:path ex:email ; sh:minCount 1 ] .
        "#;
        let data = graph(r#"ex:alice a ex:Person ."#);
        let shapes = graph(shapes);

        let tolerant = ShaclChecker::new(WarningPolicy::Tolerate)
            .check(&data, &Graph::new(), &shapes)
            .unwrap();
        assert!(tolerant.conforms);
        assert_eq!(tolerant.extra.as_deref(), Some("0 violation(s), 1 warning(s), 0 info(s)"));

        let strict = ShaclChecker::new(WarningPolicy::Fail)
            .check(&data, &Graph::new(), &shapes)
            .unwrap();
        assert!(!strict.conforms);

        let report = ShaclChecker::default().validate(&data, &Graph::new(), &shapes);
        assert_eq!(report.results()[0].message(), "people should have an email");
        assert_eq!(report.results()[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_deactivated_shapes_are_skipped() {
        let report = validate(
            r#"ex:alice a ex:Person ."#,
            r#"ex:Off sh:targetClass ex:Person ; sh:deactivated true ;
                sh:property [ sh:path ex:name ; sh:minCount 1 ] ."#,
        );
        assert!(report.results().is_empty());
    }

    #[test]
    fn test_implicit_class_target() {
        let report = validate(
            r#"ex:alice a ex:Person ."#,
            r#"ex:Person a rdfs:Class, sh:NodeShape ;
                sh:property [ sh:path ex:name ; sh:minCount 1 ] ."#,
        );
        assert_eq!(report.violation_count(), 1);
    }

    #[test]
    fn test_targeted_property_shape_constrains_its_path() {
        let shapes = r#"ex:NameShape a sh:PropertyShape ;
                sh:targetClass ex:Person ;
                sh:path ex:name ;
                sh:minCount 1 ;
                sh:datatype xsd:string ."#;

        let report = validate(r#"ex:alice a ex:Person ; ex:name "Alice" ."#, shapes);
        assert!(report.results().is_empty(), "{:?}", report.results());

        let report = validate(r#"ex:bob a ex:Person ."#, shapes);
        assert_eq!(components(&report), vec!["MinCountConstraintComponent"]);
        let result = &report.results()[0];
        assert_eq!(result.focus_node().to_string(), "<http://example.org/bob>");
        assert_eq!(
            result.result_path().map(|p| p.as_str()),
            Some("http://example.org/name")
        );

        // The datatype applies to the values, not to the focus node itself
        let report = validate(r#"ex:carol a ex:Person ; ex:name 42 ."#, shapes);
        assert_eq!(components(&report), vec!["DatatypeConstraintComponent"]);
    }

    #[test]
    fn test_empty_shapes_graph_conforms() {
        let checker = ShaclChecker::default();
        let outcome = checker
            .check(&graph(r#"ex:a ex:b ex:c ."#), &Graph::new(), &Graph::new())
            .unwrap();
        assert!(outcome.conforms);
    }
}
