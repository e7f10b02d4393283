//! End-to-end compatibility checks over realistic documents
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use conforma_core::{
    check_matching_routes, check_missing_required_routes, detect_composition_issues,
    transform_composition, ConflictKind, Document, ErrorType, Level,
};

fn base_document() -> Document {
    let yaml = r##"
openapi: "3.0.3"
paths:
  /forms:
    get:
      tags: [required]
      parameters:
        - name: page
          in: query
          required: true
          schema:
            type: integer
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/FormList"
        "404": {}
    post:
      tags: [required]
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Form"
      responses:
        "201": {}
  /forms/preview:
    get:
      tags: [experimental]
      responses:
        "200": {}
  /themes:
    get:
      tags: [optional]
      responses:
        "200": {}
components:
  schemas:
    Form:
      type: object
      additionalProperties: false
      required: [id, kind, title]
      properties:
        id:
          type: string
        title:
          type: string
        kind:
          enum: [survey, quiz]
        fields:
          type: array
          items:
            type: object
            properties:
              label:
                type: string
    FormList:
      type: object
      properties:
        items:
          type: array
          items:
            $ref: "#/components/schemas/Form"
"##;
    serde_yaml::from_str(yaml).expect("base document parses")
}

fn impl_document() -> Document {
    let yaml = r##"
openapi: "3.0.3"
paths:
  /forms:
    get:
      parameters:
        - name: page
          in: query
          schema:
            type: integer
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/FormList"
    post:
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Form"
      responses:
        "201": {}
components:
  schemas:
    Form:
      type: object
      required: [id]
      properties:
        id:
          type: string
        kind:
          enum: [survey]
        internal:
          type: string
        fields:
          type: array
          items:
            type: object
            properties:
              label:
                type: integer
    FormList:
      type: object
      properties:
        items:
          type: array
          items:
            $ref: "#/components/schemas/Form"
"##;
    serde_yaml::from_str(yaml).expect("impl document parses")
}

#[test]
fn test_full_check_reports_every_discrepancy_in_one_pass() {
    let base = base_document();
    let implementation = impl_document();

    let mut report = check_missing_required_routes(&base, &implementation);
    report.merge(check_matching_routes(&base, &implementation).unwrap());

    // Missing routes first: the experimental preview route is exempt, the
    // optional themes route only warns.
    let missing: Vec<_> = report
        .iter()
        .filter(|e| e.error_type == ErrorType::MissingRoute)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].level, Level::Warning);
    assert_eq!(missing[0].message, "Missing optional route 'GET /themes'");

    // GET /forms: missing 404 response and weakened parameter.
    let get_forms: Vec<_> = report
        .iter()
        .filter(|e| e.endpoint.as_deref() == Some("GET /forms"))
        .collect();
    let messages: Vec<&str> = get_forms.iter().map(|e| e.message.as_str()).collect();
    assert!(messages.contains(&"Missing response status code [404]"));
    assert!(messages.contains(&"Parameter [page] must be required"));

    // The GET response body resolves $refs on both sides and walks into
    // the shared Form schema.
    let get_subtypes: Vec<ConflictKind> = get_forms.iter().map(|e| e.sub_type).collect();
    assert!(get_subtypes.contains(&ConflictKind::MissingField));
    assert!(get_subtypes.contains(&ConflictKind::EnumConflict));
    assert!(get_subtypes.contains(&ConflictKind::ExtraField));
    assert!(get_subtypes.contains(&ConflictKind::TypeConflict));

    // POST /forms re-reports the same schema discrepancies against the
    // request body, tagged with its own endpoint.
    let post_forms: Vec<_> = report
        .iter()
        .filter(|e| e.endpoint.as_deref() == Some("POST /forms"))
        .collect();
    assert!(post_forms
        .iter()
        .any(|e| e.sub_type == ConflictKind::MissingField
            && e.location.as_deref() == Some("requestBody.title")));

    // Nothing in the pass aborted early; warnings and errors coexist.
    assert!(report.error_level_count() >= 5);
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn test_experimental_routes_never_conflict() {
    let base = base_document();
    // Implementation without the preview route and without themes.
    let implementation = impl_document();

    let conflicts = check_matching_routes(&base, &implementation).unwrap();
    assert!(conflicts
        .iter()
        .all(|e| e.endpoint.as_deref() != Some("GET /forms/preview")));

    let missing = check_missing_required_routes(&base, &implementation);
    assert!(missing
        .iter()
        .all(|e| e.endpoint.as_deref() != Some("GET /forms/preview")));
}

#[test]
fn test_normalization_before_comparison_removes_false_positives() {
    let base: Document = serde_yaml::from_str(
        r##"
paths:
  /forms:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Form"
components:
  schemas:
    Form:
      allOf:
        - $ref: "#/components/schemas/Base"
        - properties:
            name:
              type: string
    Base:
      type: object
"##,
    )
    .unwrap();

    // The implementation declares the composition pattern the base avoids.
    let implementation: Document = serde_yaml::from_str(
        r##"
paths:
  /forms:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Form"
components:
  schemas:
    Form:
      type: object
      allOf:
        - $ref: "#/components/schemas/Base"
        - properties:
            name:
              type: string
    Base:
      type: object
"##,
    )
    .unwrap();

    assert!(detect_composition_issues(&implementation));
    let outcome = transform_composition(&implementation);
    assert!(outcome.had_issues);

    let normalized = outcome.document;
    let form = normalized.components.schemas["Form"].as_object().unwrap();
    assert!(form.schema_type.is_none());

    let conflicts = check_matching_routes(&base, &normalized).unwrap();
    assert!(conflicts.is_empty());
}
