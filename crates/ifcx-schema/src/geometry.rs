//! Geometry and presentation: points, directions, placements, profiles,
//! swept solids, shape representations and colours.

use ifcx_step::{Decl, SchemaBuilder};

use crate::{label, text};

pub(crate) fn declare(b: &mut SchemaBuilder) {
    b.entity("IfcRepresentationItem").abstract_entity();
    b.entity("IfcGeometricRepresentationItem")
        .subtype_of("IfcRepresentationItem")
        .abstract_entity();

    b.entity("IfcPoint")
        .subtype_of("IfcGeometricRepresentationItem")
        .abstract_entity();
    b.entity("IfcCartesianPoint")
        .subtype_of("IfcPoint")
        .attribute("Coordinates", Decl::list(Decl::named("IfcLengthMeasure")));
    b.entity("IfcDirection")
        .subtype_of("IfcGeometricRepresentationItem")
        .attribute("DirectionRatios", Decl::list(Decl::named("IfcReal")));
    b.entity("IfcCartesianPointList")
        .subtype_of("IfcGeometricRepresentationItem")
        .abstract_entity();
    b.entity("IfcCartesianPointList3D")
        .subtype_of("IfcCartesianPointList")
        .attribute(
            "CoordList",
            Decl::list(Decl::list(Decl::named("IfcLengthMeasure"))),
        );

    b.entity("IfcPlacement")
        .subtype_of("IfcGeometricRepresentationItem")
        .abstract_entity()
        .attribute("Location", Decl::named("IfcCartesianPoint"));
    b.entity("IfcAxis2Placement2D")
        .subtype_of("IfcPlacement")
        .optional("RefDirection", Decl::named("IfcDirection"));
    b.entity("IfcAxis2Placement3D")
        .subtype_of("IfcPlacement")
        .optional("Axis", Decl::named("IfcDirection"))
        .optional("RefDirection", Decl::named("IfcDirection"));

    b.entity("IfcObjectPlacement")
        .abstract_entity()
        .inverse("PlacesObject", "IfcProduct", "ObjectPlacement")
        .inverse("ReferencedByPlacements", "IfcLocalPlacement", "PlacementRelTo");
    b.entity("IfcLocalPlacement")
        .subtype_of("IfcObjectPlacement")
        .optional("PlacementRelTo", Decl::named("IfcObjectPlacement"))
        .attribute("RelativePlacement", Decl::named("IfcAxis2Placement"));

    b.entity("IfcProfileDef")
        .abstract_entity()
        .attribute("ProfileType", Decl::named("IfcProfileTypeEnum"))
        .optional("ProfileName", label());
    b.entity("IfcParameterizedProfileDef")
        .subtype_of("IfcProfileDef")
        .abstract_entity()
        .optional("Position", Decl::named("IfcAxis2Placement2D"));
    b.entity("IfcRectangleProfileDef")
        .subtype_of("IfcParameterizedProfileDef")
        .attribute("XDim", Decl::named("IfcPositiveLengthMeasure"))
        .attribute("YDim", Decl::named("IfcPositiveLengthMeasure"));

    b.entity("IfcSolidModel")
        .subtype_of("IfcGeometricRepresentationItem")
        .abstract_entity();
    b.entity("IfcSweptAreaSolid")
        .subtype_of("IfcSolidModel")
        .abstract_entity()
        .attribute("SweptArea", Decl::named("IfcProfileDef"))
        .optional("Position", Decl::named("IfcAxis2Placement3D"));
    b.entity("IfcExtrudedAreaSolid")
        .subtype_of("IfcSweptAreaSolid")
        .attribute("ExtrudedDirection", Decl::named("IfcDirection"))
        .attribute("Depth", Decl::named("IfcPositiveLengthMeasure"));

    b.entity("IfcRepresentationContext")
        .optional("ContextIdentifier", label())
        .optional("ContextType", label());
    b.entity("IfcGeometricRepresentationContext")
        .subtype_of("IfcRepresentationContext")
        .attribute("CoordinateSpaceDimension", Decl::named("IfcDimensionCount"))
        .optional("Precision", Decl::named("IfcReal"))
        .attribute("WorldCoordinateSystem", Decl::named("IfcAxis2Placement"))
        .optional("TrueNorth", Decl::named("IfcDirection"));

    b.entity("IfcRepresentation")
        .attribute("ContextOfItems", Decl::named("IfcRepresentationContext"))
        .optional("RepresentationIdentifier", label())
        .optional("RepresentationType", label())
        .attribute("Items", Decl::list(Decl::named("IfcRepresentationItem")))
        .inverse("OfProductRepresentation", "IfcProductRepresentation", "Representations");
    b.entity("IfcShapeModel")
        .subtype_of("IfcRepresentation")
        .abstract_entity();
    b.entity("IfcShapeRepresentation").subtype_of("IfcShapeModel");
    b.entity("IfcProductRepresentation")
        .optional("Name", label())
        .optional("Description", text())
        .attribute("Representations", Decl::list(Decl::named("IfcRepresentation")));
    b.entity("IfcProductDefinitionShape")
        .subtype_of("IfcProductRepresentation")
        .inverse("ShapeOfProduct", "IfcProduct", "Representation");

    b.entity("IfcColourSpecification")
        .abstract_entity()
        .optional("Name", label());
    b.entity("IfcColourRgb")
        .subtype_of("IfcColourSpecification")
        .attribute("Red", Decl::named("IfcNormalisedRatioMeasure"))
        .attribute("Green", Decl::named("IfcNormalisedRatioMeasure"))
        .attribute("Blue", Decl::named("IfcNormalisedRatioMeasure"));
}
